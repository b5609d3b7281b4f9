pub mod error;
pub mod format;
pub mod interactive;
pub mod output;

pub use error::{handle_flow, report_error, FlowResult};
pub use interactive::{prompt_input, prompt_multiline, prompt_yes_no};
pub use output::{print_warning, DisplayFormatter, ListFormat, OutputStyle};
