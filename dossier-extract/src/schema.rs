//! Per-category extraction instructions and response schemas.
//!
//! Each document category maps to one instruction, one JSON response shape,
//! and (for the registration certificate only) a web-lookup capability so
//! the model can cross-reference the public tax registry.

use dossier_core::category::{CURRENT_YEAR, DocCategory, PRIOR_YEAR};
use dossier_core::profile::field;
use serde_json::{Value, json};

/// What one extraction call asks of the model.
#[derive(Debug, Clone)]
pub struct CategorySpec {
    /// Natural-language instruction sent alongside the document.
    pub instruction: String,
    /// Response schema the model must honor (string fields only).
    pub response_schema: Value,
    /// Field names expected back, in wire form.
    pub fields: &'static [&'static str],
    /// Whether the model may call web search for registry cross-reference.
    pub web_lookup: bool,
}

fn string_object_schema(fields: &[(&str, Option<&str>)]) -> Value {
    let mut properties = serde_json::Map::new();
    for (name, description) in fields {
        let mut prop = serde_json::Map::new();
        prop.insert("type".to_string(), json!("STRING"));
        if let Some(d) = description {
            prop.insert("description".to_string(), json!(d));
        }
        properties.insert((*name).to_string(), Value::Object(prop));
    }
    json!({ "type": "OBJECT", "properties": properties })
}

/// Instruction + schema table for a document category.
pub fn spec_for(category: DocCategory) -> CategorySpec {
    match category {
        DocCategory::Registration => CategorySpec {
            instruction: "\
1. Extract the 'Tax ID' (Mã số thuế) and 'Company Name' (Tên công ty) from the document.
2. Use the web search tool to look up the Tax ID on \"masothue.com\".
3. On the masothue.com page, locate the specific field labeled \"Ngành nghề chính\" (Main Business Line).
4. EXTRACT the EXACT full text content of this field.
   - Do not look for a table of multiple industries. Use only the field explicitly labeled \"Ngành nghề chính\".
   - Copy the content verbatim, including the \"Chi tiết:\" (Detail) part if it exists.
5. Return the Company Name, Tax ID, and this full Business Line string."
                .to_string(),
            response_schema: string_object_schema(&[
                (field::COMPANY_NAME, None),
                (field::TAX_ID, None),
                (
                    field::BUSINESS_LINE,
                    Some("The complete text of the main business line."),
                ),
            ]),
            fields: &[field::COMPANY_NAME, field::TAX_ID, field::BUSINESS_LINE],
            web_lookup: true,
        },
        DocCategory::FinancialPriorYear => CategorySpec {
            instruction: format!(
                "Extract the Net Revenue (Doanh thu thuần) or Total Revenue (Tổng doanh thu) \
                 for {PRIOR_YEAR} from the Income Statement (Báo cáo kết quả kinh doanh). \
                 Return just the number or string representation of the money."
            ),
            response_schema: string_object_schema(&[(field::REVENUE, None)]),
            fields: &[field::REVENUE],
            web_lookup: false,
        },
        DocCategory::FinancialCurrentYear => CategorySpec {
            instruction: format!(
                "Extract data from the Income Statement (Báo cáo kết quả kinh doanh) for {CURRENT_YEAR}:
1. Net Revenue (Doanh thu thuần) or Total Revenue (Tổng doanh thu).
2. Net Profit after tax (Lợi nhuận sau thuế).
Return the exact numbers or strings found."
            ),
            response_schema: string_object_schema(&[
                (field::REVENUE, None),
                (
                    field::NET_PROFIT_OR_LOSS,
                    Some("Lợi nhuận sau thuế (Profit after tax)"),
                ),
            ]),
            fields: &[field::REVENUE, field::NET_PROFIT_OR_LOSS],
            web_lookup: false,
        },
        DocCategory::VatQuarter(_) => CategorySpec {
            instruction: "Extract the value from target [34] - Total Revenue (Tổng doanh thu) \
                          from this VAT declaration."
                .to_string(),
            response_schema: string_object_schema(&[(field::REVENUE, None)]),
            fields: &[field::REVENUE],
            web_lookup: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::category::Quarter;

    #[test]
    fn test_only_registration_gets_web_lookup() {
        for cat in DocCategory::ALL {
            let spec = spec_for(cat);
            assert_eq!(spec.web_lookup, cat == DocCategory::Registration);
        }
    }

    #[test]
    fn test_registration_instruction_names_the_registry() {
        let spec = spec_for(DocCategory::Registration);
        assert!(spec.instruction.contains("masothue.com"));
        assert!(spec.instruction.contains("Ngành nghề chính"));
        assert!(spec.instruction.contains("Chi tiết:"));
    }

    #[test]
    fn test_schemas_declare_expected_fields() {
        for cat in DocCategory::ALL {
            let spec = spec_for(cat);
            let properties = spec.response_schema["properties"]
                .as_object()
                .expect("schema has properties");
            for field in spec.fields {
                assert!(properties.contains_key(*field), "{field} missing for {cat}");
                assert_eq!(properties[*field]["type"], "STRING");
            }
        }
    }

    #[test]
    fn test_vat_instruction_targets_line_34() {
        let spec = spec_for(DocCategory::VatQuarter(Quarter::Q2));
        assert!(spec.instruction.contains("[34]"));
        assert_eq!(spec.fields, &["revenue"]);
    }
}
