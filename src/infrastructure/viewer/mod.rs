// Viewer - request-scoped caller context

pub mod viewer;

pub use viewer::ViewerContext;
