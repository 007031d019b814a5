use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(max) = args.max_records {
        if max == 0 {
            return Err("invalid max-records, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected html, json or text"
            ));
        }
    }
    if args.page {
        if let Some(raw) = args.output_format.as_deref() {
            if crate::output::OutputFormat::parse(raw) != Some(crate::output::OutputFormat::Html) {
                return Err("--page only supports the html output format".to_string());
            }
        }
    }
    if args.color && args.no_color {
        return Err("use either --color or --no-color, not both".to_string());
    }
    Ok(())
}
