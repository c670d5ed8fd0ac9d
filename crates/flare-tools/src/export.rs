//! Editor export documents.
//!
//! The particle editor exports a JSON array of projects, each holding named
//! emitter configurations. Alpha maps are stored as image paths; turning them
//! into texture handles is up to the host's resolver. Without a resolver the
//! resolved configuration carries no alpha maps.
//!
//! Resolution is a pure function of the document and the selection.

use std::fs;
use std::path::Path;

use flare_common::{ExportError, FlareResult};
use flare_kernel::{
    AlphaMapHandle, EmitterSettings, ParticleSettings, RenderSettings, SimulationConfig,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One emitter as exported by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEmitterConfig {
    /// Emitter ID, unique within its project
    pub id: String,
    /// Particle settings with alpha maps as image paths
    #[serde(default)]
    pub particles: ParticleSettings<String>,
    /// Render settings
    #[serde(default)]
    pub render: RenderSettings,
    /// Emitter settings
    #[serde(default)]
    pub emitter: EmitterSettings,
    /// Emitter position set in the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
}

/// A project holding several emitters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportProject {
    /// Project ID
    pub id: String,
    /// Emitters in editor order
    #[serde(default)]
    pub configs: Vec<ExportEmitterConfig>,
}

/// A complete editor export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportDocument {
    /// Projects in export order
    pub projects: Vec<ExportProject>,
}

impl ExportDocument {
    /// Parses an export from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        serde_json::from_str(json).map_err(|e| ExportError::Parse(e.to_string()))
    }

    /// Reads and parses an export file.
    pub fn load(path: impl AsRef<Path>) -> FlareResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let document = Self::from_json(&json)?;
        debug!(
            "Loaded export {} with {} projects",
            path.display(),
            document.projects.len()
        );
        Ok(document)
    }

    /// Finds a project by ID.
    pub fn project(&self, project_id: &str) -> Result<&ExportProject, ExportError> {
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| ExportError::ProjectNotFound {
                project: project_id.to_string(),
            })
    }

    /// Finds an emitter by project and emitter ID.
    pub fn emitter(
        &self,
        project_id: &str,
        emitter_id: &str,
    ) -> Result<&ExportEmitterConfig, ExportError> {
        self.project(project_id)?
            .configs
            .iter()
            .find(|c| c.id == emitter_id)
            .ok_or_else(|| ExportError::EmitterNotFound {
                project: project_id.to_string(),
                emitter: emitter_id.to_string(),
            })
    }
}

/// A configuration selected out of an export.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Simulation configuration
    pub config: SimulationConfig,
    /// Emitter position set in the editor, if any
    pub position: Option<Vec3>,
}

/// Selects an emitter without resolving alpha maps.
pub fn resolve(
    document: &ExportDocument,
    project_id: &str,
    emitter_id: &str,
) -> Result<ResolvedConfig, ExportError> {
    let entry = document.emitter(project_id, emitter_id)?;
    let mut particles = entry.particles.clone();
    particles.alpha_maps_start.clear();
    particles.alpha_maps_end.clear();
    Ok(build(entry, particles.map_alpha_maps(AlphaMapHandle::new)))
}

/// Selects an emitter, turning every alpha-map path into a handle with
/// `resolver`.
pub fn resolve_with<F>(
    document: &ExportDocument,
    project_id: &str,
    emitter_id: &str,
    mut resolver: F,
) -> Result<ResolvedConfig, ExportError>
where
    F: FnMut(&str) -> AlphaMapHandle,
{
    let entry = document.emitter(project_id, emitter_id)?;
    let particles = entry
        .particles
        .clone()
        .map_alpha_maps(|path| resolver(&path));
    Ok(build(entry, particles))
}

fn build(entry: &ExportEmitterConfig, particles: ParticleSettings) -> ResolvedConfig {
    debug!(
        "Resolved emitter \"{}\" ({} alpha maps)",
        entry.id,
        particles.alpha_map_count()
    );
    ResolvedConfig {
        config: SimulationConfig {
            particles,
            render: entry.render,
            emitter: entry.emitter,
        },
        position: entry.position,
    }
}
