mod config;
mod io;
mod model;
mod scattered;
mod space;
