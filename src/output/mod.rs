pub mod formatter;

pub use formatter::{
    format_definitions, format_json, format_percent, format_report, format_tsv, format_value,
    should_use_colors,
};
