use crate::dom::{escape_html, DomError, Document};
use crate::form::{CONTAINER_ID, COUNT_FIELD_ID};
use crate::records::OfferDetails;

fn offer_fields_html(offer: &OfferDetails) -> String {
    let mut out = String::new();
    for (name, label) in OfferDetails::FIELDS {
        let value = offer
            .get(name)
            .map(|v| format!(r#" value="{}""#, escape_html(v)))
            .unwrap_or_default();
        out.push_str(&format!(
            r#"      <label for="{name}">{label}</label>
      <input type="text" id="{name}" name="{name}"{value} required><br><br>
"#
        ));
    }
    out
}

/// A standalone page holding the offer form, the count field and the
/// current contents of the records container.
pub fn render_page(doc: &Document, offer: &OfferDetails) -> Result<Vec<u8>, DomError> {
    let count_input = doc.input(COUNT_FIELD_ID)?.to_html();
    let records = doc.inner_html(CONTAINER_ID)?;
    let offer_fields = offer_fields_html(offer);

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Cover Letter Generator</title>
  <style>
    body {{
      font-family: Arial, Helvetica, sans-serif;
      margin: 2rem auto;
      max-width: 720px;
      color: #1f2937;
    }}
    label {{
      display: inline-block;
      min-width: 140px;
      font-weight: 600;
    }}
    input {{
      padding: 0.25rem 0.5rem;
      border: 1px solid #9ca3af;
      border-radius: 4px;
    }}
    #{CONTAINER_ID} h3 {{
      margin-top: 1.5rem;
      border-bottom: 1px solid #d1d5db;
    }}
  </style>
</head>
<body>
  <h1>Cover Letter Generator</h1>
  <form method="post">
    <fieldset>
      <legend>Offer</legend>
{offer_fields}    </fieldset>
    <fieldset>
      <legend>Records</legend>
      <label for="{COUNT_FIELD_ID}">Number of Records:</label>
      {count_input}<br><br>
      <div id="{CONTAINER_ID}">{records}</div>
    </fieldset>
    <button type="submit">Generate</button>
  </form>
</body>
</html>
"####
    );

    Ok(html.into_bytes())
}
