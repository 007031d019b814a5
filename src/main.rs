use std::process::exit;

fn main() {
    if let Err(e) = recordform::app::run_cli() {
        eprintln!("{}", recordform::app::error_line(&e));
        exit(1);
    }
}
