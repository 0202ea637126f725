//! Explicit session state: loaded documents, tree geometry, points and the batch cursor.

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    reset_layout, Edge, GridConfig, LayoutConfig, Point, Record, TreeArena,
};

/// Everything one rendering session owns.
///
/// Created once the documents are loaded; [`SessionState::reset`] restores the initial
/// runnable state after a viewport change.
#[derive(Debug)]
pub struct SessionState {
    pub(crate) tree: TreeArena,
    pub(crate) records: Vec<Record>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) points: Vec<Point>,
    /// Number of records fully settled
    pub(crate) cursor: usize,
    pub(crate) animating: bool,
    pub(crate) log: Vec<String>,
    viewport_width: f64,
    layout: LayoutConfig,
    grid: GridConfig,
}

impl SessionState {
    /// Validate the tree and lay it out for `viewport_width`.
    #[instrument(level = "debug", skip(tree, records, layout, grid))]
    pub fn new(
        tree: TreeArena,
        records: Vec<Record>,
        viewport_width: f64,
        layout: LayoutConfig,
        grid: GridConfig,
    ) -> ApplicationResult<Self> {
        tree.validate()?;
        let mut session = Self {
            tree,
            records,
            edges: Vec::new(),
            points: Vec::new(),
            cursor: 0,
            animating: false,
            log: Vec::new(),
            viewport_width,
            layout,
            grid,
        };
        session.reset(viewport_width)?;
        Ok(session)
    }

    /// Re-layout for `viewport_width` and discard every point, accumulation list,
    /// log line and the batch cursor. In-flight point state is dropped, not finished.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self, viewport_width: f64) -> ApplicationResult<()> {
        self.viewport_width = viewport_width;
        self.edges = reset_layout(&mut self.tree, viewport_width, &self.layout)?;
        self.points.clear();
        self.log.clear();
        self.cursor = 0;
        self.animating = false;
        debug!(
            "reset: {} nodes, {} edges, {} records",
            self.tree.len(),
            self.edges.len(),
            self.records.len()
        );
        Ok(())
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Points created so far, in record order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Summary lines of settled points, in record order.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn remaining(&self) -> usize {
        self.total().saturating_sub(self.cursor)
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// No further batches can run.
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.total()
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn grid_config(&self) -> &GridConfig {
        &self.grid
    }
}
