use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "recordform",
    version,
    about = "record input form generator",
    long_about = "Recordform builds the repeated record inputs (S.no, description, rate, quantity) of an offer form from a record count, and reads filled-in values back into records.\n\nExamples:\n  recordform -n 3\n  recordform -n 2 --page -o form.html\n  recordform -n 2 --values values.yml -f text\n  recordform -n 2 --config ~/.recordform/config.yml\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'N',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'n',
        long = "cnt",
        visible_alias = "count",
        value_name = "VALUE",
        allow_hyphen_values = true,
        help_heading = "Form",
        help = "Value of the records_count field."
    )]
    pub count: Option<String>,

    #[arg(
        short = 's',
        long = "st",
        visible_alias = "strict",
        help_heading = "Form",
        help = "Reject counts that are not non-negative integers instead of treating them as zero."
    )]
    pub strict: bool,

    #[arg(
        short = 'm',
        long = "mr",
        visible_alias = "max-records",
        value_name = "N",
        help_heading = "Form",
        help = "Maximum number of record groups to generate."
    )]
    pub max_records: Option<usize>,

    #[arg(
        short = 'i',
        long = "vl",
        visible_alias = "values",
        value_name = "FILE",
        help_heading = "Input",
        help = "Fill the generated inputs from a YAML/JSON map of field name to value."
    )]
    pub values: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.recordform/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write output to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (html, json, text)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        help_heading = "Output",
        help = "Render a standalone HTML page around the generated records."
    )]
    pub page: bool,
}
