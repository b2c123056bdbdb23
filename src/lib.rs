pub mod extract;
pub mod handoff;
pub mod load;
pub mod model;
pub mod pipeline;
pub mod table;
pub mod transform;
