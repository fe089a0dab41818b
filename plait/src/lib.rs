pub use plait_scalar::{Record, Value};
pub use {
    plait_error as error, plait_expr as expr, plait_file as file, plait_io as io,
    plait_layout as layout, plait_scalar as scalar, plait_scan as scan, plait_schema as schema,
};

mod job;

pub use job::*;
