use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rxhcc_model::Severity;
use rxhcc_standards::RuleCatalog;
use rxhcc_validate::{BatchSummary, PipelineOutcome, RecordResult};

pub fn print_batch_summary(summary: &BatchSummary, results: &[RecordResult]) {
    println!("Claims validated: {}", summary.total_claims);
    println!(
        "Flagged: {} ({}% pass rate)",
        summary.flagged_claims, summary.pass_rate
    );
    println!("Amount at risk: ${:.2}", summary.total_amount_at_risk);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Claims"),
        header_cell("Anomaly type"),
        header_cell("Claims"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let severities = ordered_counts(&summary.severity_distribution, severity_order);
    let anomalies: Vec<(String, usize)> = summary
        .anomaly_distribution
        .iter()
        .map(|(kind, count)| (kind.clone(), *count))
        .collect();
    let rows = severities.len().max(anomalies.len()).max(1);
    for index in 0..rows {
        let (severity, severity_count) = match severities.get(index) {
            Some((label, count)) => (severity_label_cell(label), Cell::new(count)),
            None => (dim_cell("-"), dim_cell("-")),
        };
        let (anomaly, anomaly_count) = match anomalies.get(index) {
            Some((kind, count)) => (Cell::new(kind), Cell::new(count)),
            None => (dim_cell("-"), dim_cell("-")),
        };
        table.add_row(vec![severity, severity_count, anomaly, anomaly_count]);
    }
    println!("{table}");
    print_flagged_table(results);
}

fn print_flagged_table(results: &[RecordResult]) {
    let flagged: Vec<&RecordResult> = results.iter().filter(|result| result.is_flagged).collect();
    if flagged.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Claim"),
        header_cell("Stage"),
        header_cell("Severity"),
        header_cell("Amount"),
        header_cell("Violations"),
    ]);
    apply_detail_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for result in flagged {
        let violations: Vec<&str> = result
            .findings
            .iter()
            .filter(|finding| finding.severity.is_flagging())
            .map(|finding| finding.rule_id.as_str())
            .collect();
        table.add_row(vec![
            Cell::new(&result.claim_id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(result.stage.as_str()),
            severity_cell(result.max_severity),
            Cell::new(format!("{:.2}", result.claim_amount)),
            Cell::new(violations.join(", ")),
        ]);
    }
    println!();
    println!("Flagged claims:");
    println!("{table}");
}

pub fn print_claim_outcome(outcome: &PipelineOutcome) {
    println!("Claim: {}", outcome.claim_id());
    println!("Stage: {}", outcome.stage);
    if let Some(metadata) = &outcome.metadata {
        println!(
            "Risk: {} (score {})",
            metadata.risk_level.as_str(),
            metadata.risk_score
        );
    }
    if outcome.should_escalate {
        println!("Escalated: {}", outcome.escalation_reason);
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule"),
        header_cell("Severity"),
        header_cell("Message"),
    ]);
    apply_detail_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for finding in &outcome.findings {
        table.add_row(vec![
            Cell::new(&finding.rule_id),
            severity_cell(finding.severity),
            Cell::new(&finding.message),
        ]);
    }
    println!("{table}");
}

pub fn print_rule_catalog(catalog: &RuleCatalog) {
    let mut mappings = Table::new();
    mappings.set_header(vec![
        header_cell("ICD prefix"),
        header_cell("Diagnosis"),
        header_cell("Valid NDC prefixes"),
    ]);
    apply_detail_table_style(&mut mappings);
    for mapping in catalog.mappings() {
        mappings.add_row(vec![
            Cell::new(&mapping.icd_prefix)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&mapping.description),
            Cell::new(mapping.valid_ndc_prefixes.join(", ")),
        ]);
    }
    println!("ICD/NDC mappings:");
    println!("{mappings}");

    let mut conflicts = Table::new();
    conflicts.set_header(vec![
        header_cell("Rule"),
        header_cell("Severity"),
        header_cell("Codes A"),
        header_cell("Codes B"),
        header_cell("Message"),
    ]);
    apply_detail_table_style(&mut conflicts);
    align_column(&mut conflicts, 1, CellAlignment::Center);
    for conflict in catalog.conflicts() {
        conflicts.add_row(vec![
            Cell::new(&conflict.rule_id),
            severity_cell(conflict.severity),
            Cell::new(conflict.codes_a.join(", ")),
            Cell::new(conflict.codes_b.join(", ")),
            Cell::new(&conflict.message),
        ]);
    }
    println!();
    println!("Conflicting diagnoses:");
    println!("{conflicts}");

    let glp1 = catalog.glp1();
    println!();
    println!("GLP-1 indications:");
    println!("  NDC prefixes: {}", glp1.ndc_prefixes.join(", "));
    println!("  Approved ICD: {}", glp1.approved_icd_prefixes.join(", "));
    println!("  Contraindicated ICD: {}", glp1.type1_icd_prefix);

    let mut upcoding = Table::new();
    upcoding.set_header(vec![
        header_cell("HCC"),
        header_cell("Expected ICDs"),
        header_cell("Description"),
        header_cell("RAF impact"),
    ]);
    apply_detail_table_style(&mut upcoding);
    align_column(&mut upcoding, 3, CellAlignment::Right);
    for rule in catalog.upcoding_rules() {
        upcoding.add_row(vec![
            Cell::new(&rule.hcc_code)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(rule.expected_icds.join(", ")),
            Cell::new(&rule.description),
            Cell::new(format!("{:.3}", rule.risk_score_impact)),
        ]);
    }
    println!();
    println!("High-risk HCC justification:");
    println!("{upcoding}");
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_detail_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn ordered_counts(
    distribution: &std::collections::BTreeMap<String, usize>,
    rank: fn(&str) -> u8,
) -> Vec<(String, usize)> {
    let mut ordered: Vec<(String, usize)> = distribution
        .iter()
        .map(|(label, count)| (label.clone(), *count))
        .collect();
    ordered.sort_by(|a, b| rank(&b.0).cmp(&rank(&a.0)).then_with(|| a.0.cmp(&b.0)));
    ordered
}

fn severity_order(label: &str) -> u8 {
    match label {
        "CRITICAL" => 3,
        "WARNING" => 2,
        "INFO" => 1,
        _ => 0,
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Critical => Cell::new("CRITICAL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARNING").fg(Color::Yellow),
        Severity::Info => Cell::new("INFO").fg(Color::Cyan),
        Severity::Pass => Cell::new("PASS").fg(Color::Green),
    }
}

fn severity_label_cell(label: &str) -> Cell {
    match label {
        "CRITICAL" => Cell::new(label).fg(Color::Red).add_attribute(Attribute::Bold),
        "WARNING" => Cell::new(label).fg(Color::Yellow),
        "INFO" => Cell::new(label).fg(Color::Cyan),
        "PASS" => Cell::new(label).fg(Color::Green),
        _ => Cell::new(label),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
