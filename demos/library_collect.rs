use recordform::output::{render_records, OutputFormat};
use recordform::runner::{Options, Runner, ValuesSource};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let values = [
        ("company_name", "Acme Pumps"),
        ("sn_0", "1"),
        ("description_0", "Impeller"),
        ("rate_0", "1450.00"),
        ("quantity_0", "2"),
        ("sn_1", "2"),
        ("description_1", "Shaft seal"),
        ("rate_1", "310.50"),
        ("quantity_1", "4"),
    ];
    let runner = Runner::new(Options {
        count: "2".to_string(),
        values: Some(ValuesSource::Inline(
            values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )),
        ..Options::default()
    })?;
    let result = runner.run().await?;

    for v in result.violations.iter() {
        println!("violation: {v}");
    }
    if let Some(records) = result.records.as_ref() {
        let text = render_records(OutputFormat::Text, records, &result.offer);
        print!("{}", String::from_utf8_lossy(&text));
    }

    Ok(())
}
