use super::writer::{check_suffix, create_parent_dir, output_name, StepHistory, VariableWriter};
use crate::mesh::TriangleMesh2d;
use crate::space::{Function, SpaceKind};
use eyre::{eyre, WrapErr};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct XdmfEntry {
    name: String,
    time: f64,
    center: &'static str,
    values: Vec<f64>,
}

/// XDMF file with all heavy data stored inline as XML.
///
/// Unstepped writes are stored at time 0. The whole file is rewritten on every write.
pub struct XdmfWriter {
    path: PathBuf,
    history: StepHistory,
    mesh: Option<Arc<TriangleMesh2d<f64>>>,
    entries: Vec<XdmfEntry>,
}

impl XdmfWriter {
    pub const SUFFIX: &'static str = "xdmf";

    pub fn new(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();
        check_suffix(&path, Self::SUFFIX)?;
        Ok(Self {
            path,
            history: StepHistory::new(),
            mesh: None,
            entries: Vec::new(),
        })
    }

    fn to_xml(&self, mesh: &TriangleMesh2d<f64>) -> Result<String, std::fmt::Error> {
        let num_cells = mesh.num_cells();
        let num_vertices = mesh.num_vertices();

        let mut topology = String::new();
        for cell in mesh.connectivity() {
            let [a, b, c] = cell.0;
            writeln!(topology, "{a} {b} {c}")?;
        }
        let mut geometry = String::new();
        for v in mesh.vertices() {
            writeln!(geometry, "{} {}", v.x, v.y)?;
        }

        let mut xml = String::new();
        writeln!(xml, "<?xml version=\"1.0\"?>")?;
        writeln!(xml, "<Xdmf Version=\"3.0\">")?;
        writeln!(xml, "  <Domain>")?;
        writeln!(
            xml,
            "    <Grid Name=\"TimeSeries\" GridType=\"Collection\" CollectionType=\"Temporal\">"
        )?;
        for entry in &self.entries {
            writeln!(xml, "      <Grid Name=\"mesh\" GridType=\"Uniform\">")?;
            writeln!(
                xml,
                "        <Topology TopologyType=\"Triangle\" NumberOfElements=\"{num_cells}\" NodesPerElement=\"3\">"
            )?;
            writeln!(
                xml,
                "          <DataItem Dimensions=\"{num_cells} 3\" NumberType=\"UInt\" Format=\"XML\">"
            )?;
            write!(xml, "{topology}")?;
            writeln!(xml, "          </DataItem>")?;
            writeln!(xml, "        </Topology>")?;
            writeln!(xml, "        <Geometry GeometryType=\"XY\">")?;
            writeln!(
                xml,
                "          <DataItem Dimensions=\"{num_vertices} 2\" Format=\"XML\">"
            )?;
            write!(xml, "{geometry}")?;
            writeln!(xml, "          </DataItem>")?;
            writeln!(xml, "        </Geometry>")?;
            writeln!(xml, "        <Time Value=\"{}\" />", entry.time)?;
            writeln!(
                xml,
                "        <Attribute Name=\"{}\" AttributeType=\"Scalar\" Center=\"{}\">",
                entry.name, entry.center
            )?;
            writeln!(
                xml,
                "          <DataItem Dimensions=\"{} 1\" Format=\"XML\">",
                entry.values.len()
            )?;
            for value in &entry.values {
                writeln!(xml, "{value}")?;
            }
            writeln!(xml, "          </DataItem>")?;
            writeln!(xml, "        </Attribute>")?;
            writeln!(xml, "      </Grid>")?;
        }
        writeln!(xml, "    </Grid>")?;
        writeln!(xml, "  </Domain>")?;
        writeln!(xml, "</Xdmf>")?;
        Ok(xml)
    }
}

impl VariableWriter for XdmfWriter {
    fn path(&self) -> &Path {
        &self.path
    }

    fn history(&self) -> &StepHistory {
        &self.history
    }

    fn write(&mut self, variable: &Function<f64>, name: Option<&str>, step: Option<f64>) -> eyre::Result<()> {
        let name = output_name(variable, name)?;
        self.history.check_step(step)?;

        let function_mesh = variable.space().mesh();
        let mesh = Arc::clone(self.mesh.get_or_insert_with(|| Arc::clone(function_mesh)));
        if !Arc::ptr_eq(&mesh, function_mesh) && mesh != *function_mesh {
            return Err(eyre!(
                "function `{}` lives on a different mesh than earlier writes to {}",
                name,
                self.path.display()
            ));
        }

        self.entries.push(XdmfEntry {
            name,
            time: step.unwrap_or(0.0),
            center: match variable.space().kind() {
                SpaceKind::Lagrange1 => "Node",
                SpaceKind::Dg0 => "Cell",
            },
            values: variable.values().to_vec(),
        });

        create_parent_dir(&self.path)?;
        let xml = self.to_xml(&mesh)?;
        std::fs::write(&self.path, xml).wrap_err_with(|| format!("failed to write {}", self.path.display()))
    }
}
