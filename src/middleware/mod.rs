pub mod propagate;

pub use propagate::{middleware, resolve, tracing_layer, TracingLayer, TracingService};
