mod msh;
