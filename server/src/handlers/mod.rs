pub mod pipeline_handlers;
