use crate::error::RenderError;
use crate::gl::{Gl, Surface};
use crate::render::Renderer;
use crate::shader::{Catalog, ShaderBody};

/// Cycles through the catalog and hot-swaps the renderer's program.
///
/// The index moves even when the newly selected body fails to build, so a
/// second press walks past a broken entry while the old program keeps
/// drawing.
#[derive(Debug, Clone)]
pub struct ShaderSelector {
    catalog: Catalog,
    index: usize,
}

impl ShaderSelector {
    /// `start` wraps around the catalog length.
    pub fn new(catalog: Catalog, start: usize) -> Self {
        let index = start % catalog.len();
        Self { catalog, index }
    }

    /// Initializes `renderer` with the first entry that builds, trying
    /// `start` and then the entries after it in catalog order.
    ///
    /// Returns the last build error when no entry builds.
    pub fn initialize<B: Gl + Surface>(
        catalog: Catalog,
        start: usize,
        renderer: &mut Renderer<B>,
    ) -> Result<Self, RenderError> {
        let start = start % catalog.len();
        let mut last_error = RenderError::NotInitialized;
        for offset in 0..catalog.len() {
            let selector = Self::new(catalog.clone(), start + offset);
            match renderer.initialize(selector.current()) {
                Ok(()) => return Ok(selector),
                Err(err) => {
                    log::error!("shader '{}' unusable: {err}", selector.current().name());
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current(&self) -> &ShaderBody {
        &self.catalog[self.index]
    }

    pub fn next<B: Gl + Surface>(&mut self, renderer: &mut Renderer<B>) -> Result<usize, RenderError> {
        self.index = (self.index + 1) % self.len();
        self.apply(renderer)
    }

    pub fn previous<B: Gl + Surface>(
        &mut self,
        renderer: &mut Renderer<B>,
    ) -> Result<usize, RenderError> {
        self.index = (self.index + self.len() - 1) % self.len();
        self.apply(renderer)
    }

    pub fn select<B: Gl + Surface>(
        &mut self,
        index: usize,
        renderer: &mut Renderer<B>,
    ) -> Result<usize, RenderError> {
        self.index = index % self.len();
        self.apply(renderer)
    }

    fn apply<B: Gl + Surface>(&self, renderer: &mut Renderer<B>) -> Result<usize, RenderError> {
        let body = self.current();
        log::debug!("selecting shader {} '{}'", self.index, body.name());
        renderer.swap_program(body).map(|()| self.index)
    }
}
