mod errors;
mod order_flow_api;
mod order_objects;
mod undo;

pub use errors::OrderFlowError;
pub use order_flow_api::OrderFlowApi;
pub use order_objects::OrderStatistics;
pub use undo::UndoBuffer;
