use recordform::dom::Document;
use recordform::form::{CountPolicy, FormGenerator, CONTAINER_ID, COUNT_FIELD_ID};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let mut doc = Document::records_form();
    let generator = FormGenerator::new(CountPolicy::Strict, 50);

    for count in ["3", "1"] {
        doc.set_value(COUNT_FIELD_ID, count)?;
        let written = generator.add_record_inputs(&mut doc)?;
        println!("records_count={count} -> {written} record group(s)");
        println!("{}", doc.inner_html(CONTAINER_ID)?);
    }

    Ok(())
}
