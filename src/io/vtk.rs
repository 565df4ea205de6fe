use crate::mesh::TriangleMesh2d;
use crate::space::{Function, SpaceKind};
use eyre::eyre;
use std::path::Path;
use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, DataSet, ElementType, IOBuffer, Piece,
    UnstructuredGridPiece, Version, VertexNumbers, Vtk,
};

/// Builds a VTK unstructured grid from a triangle mesh with attached scalar data.
///
/// Point data holds one value per mesh vertex and cell data one value per cell, which matches the
/// degrees of freedom of P1 and DG0 functions respectively.
pub struct MeshDataSetBuilder<'a> {
    mesh: &'a TriangleMesh2d<f64>,
    attributes: Attributes,
    // Only used for exporting directly to file
    title: Option<String>,
}

impl<'a> MeshDataSetBuilder<'a> {
    pub fn from_mesh(mesh: &'a TriangleMesh2d<f64>) -> Self {
        Self {
            mesh,
            attributes: Attributes::new(),
            title: None,
        }
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self
        }
    }

    pub fn with_point_scalar_attributes(mut self, name: impl Into<String>, values: &[f64]) -> eyre::Result<Self> {
        let name = name.into();
        if values.len() != self.mesh.num_vertices() {
            return Err(eyre!(
                "point attribute `{}` has {} values but the mesh has {} vertices",
                name,
                values.len(),
                self.mesh.num_vertices()
            ));
        }
        self.attributes.point.push(scalar_attribute(name, values));
        Ok(self)
    }

    pub fn with_cell_scalar_attributes(mut self, name: impl Into<String>, values: &[f64]) -> eyre::Result<Self> {
        let name = name.into();
        if values.len() != self.mesh.num_cells() {
            return Err(eyre!(
                "cell attribute `{}` has {} values but the mesh has {} cells",
                name,
                values.len(),
                self.mesh.num_cells()
            ));
        }
        self.attributes.cell.push(scalar_attribute(name, values));
        Ok(self)
    }

    /// Attaches the function as point or cell data depending on its space.
    pub fn with_function(self, function: &Function<f64>, name: &str) -> eyre::Result<Self> {
        if function.space().mesh().as_ref() != self.mesh {
            return Err(eyre!("function `{}` does not live on the exported mesh", name));
        }
        match function.space().kind() {
            SpaceKind::Lagrange1 => self.with_point_scalar_attributes(name, function.values()),
            SpaceKind::Dg0 => self.with_cell_scalar_attributes(name, function.values()),
        }
    }

    pub fn try_build(&self) -> eyre::Result<DataSet> {
        let points: Vec<f64> = self
            .mesh
            .vertices()
            .iter()
            .flat_map(|v| [v.x, v.y, 0.0])
            .collect();

        let mut connectivity = Vec::with_capacity(3 * self.mesh.num_cells());
        let mut offsets = Vec::with_capacity(self.mesh.num_cells());
        for cell in self.mesh.connectivity() {
            for &index in cell.vertex_indices() {
                connectivity.push(u64::try_from(index)?);
            }
            offsets.push(u64::try_from(connectivity.len())?);
        }

        let piece = UnstructuredGridPiece {
            points: IOBuffer::F64(points),
            cells: Cells {
                cell_verts: VertexNumbers::XML { connectivity, offsets },
                types: vec![CellType::Triangle; self.mesh.num_cells()],
            },
            data: self.attributes.clone(),
        };

        Ok(DataSet::UnstructuredGrid {
            meta: None,
            pieces: vec![Piece::Inline(Box::new(piece))],
        })
    }

    /// Convenience function for directly exporting the dataset to a file.
    ///
    /// The file format is determined by the extension, e.g. `.vtu` for XML unstructured grids.
    pub fn try_export(&self, filename: impl AsRef<Path>) -> eyre::Result<()> {
        let filepath = filename.as_ref();
        let fallback_title = filepath
            .file_stem()
            .map(|os_str| os_str.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        let dataset = self.try_build()?;
        Vtk {
            version: Version { major: 1, minor: 0 },
            // If we don't have a title then just make the filepath the title
            title: self.title.clone().unwrap_or(fallback_title),
            byte_order: ByteOrder::LittleEndian,
            data: dataset,
            file_path: None,
        }
        .export(filepath)
        .map_err(|e| eyre!("failed to export VTK file {}: {}", filepath.display(), e))
    }
}

fn scalar_attribute(name: String, values: &[f64]) -> Attribute {
    Attribute::DataArray(DataArray {
        name,
        elem: ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        data: IOBuffer::F64(values.to_vec()),
    })
}
