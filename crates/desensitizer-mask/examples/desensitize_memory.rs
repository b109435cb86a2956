use desensitizer_config::validate_config;
use desensitizer_core::CellValue;
use desensitizer_mask::{DesensitizationRun, GeneratorRegistry, MemorySinks, MemorySource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document = serde_json::json!({
        "seed": 42,
        "tables": [{"name": "customers", "columns": [
            {"name": "customerName", "type": "company"},
            {"name": "phone", "type": "phone"}
        ]}]
    });
    let config = validate_config(&document)
        .map_err(|report| format!("invalid configuration: {} errors", report.errors.len()))?
        .config;

    let source = MemorySource::new().with_table(
        "customers",
        ["customerNumber", "customerName", "phone"],
        vec![
            vec![CellValue::Int(103), CellValue::text("Acme Inc"), CellValue::text("40.32.2555")],
            vec![CellValue::Int(112), CellValue::text("Acme Inc"), CellValue::Null],
            vec![CellValue::Int(114), CellValue::text("Globex"), CellValue::text("03 9520 4555")],
        ],
    )?;

    let mut sinks = MemorySinks::new();
    let report = DesensitizationRun::new(&config, &GeneratorRegistry::new())?
        .execute(&source, &mut sinks)
        .await?;

    for row in sinks.rows("customers") {
        let values: Vec<String> = row.values().iter().map(ToString::to_string).collect();
        println!("{}", values.join(" | "));
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
