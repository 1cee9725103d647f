use crate::feature::{FeatureDocument, ScenarioRecord};

const SUMMARY_PREFIX: &str = "BDD: ";

/// Issue summary for a feature: `BDD: <name>`.
pub fn issue_summary(feature_name: &str) -> String {
    format!("{SUMMARY_PREFIX}{feature_name}")
}

/// Renders the tracking-issue description for a parsed feature.
///
/// Pure function of its inputs: no timestamps, no environment lookups.
pub fn render_description(
    document: &FeatureDocument,
    feature_path: &str,
    spec_path: &str,
    business_issue: &str,
) -> String {
    let mut md = String::new();
    md.push_str(&format!("## {}\n\n", issue_summary(&document.name)));
    md.push_str(&format!(
        "Issue de test contenedor derivado de `{}` (Historia de negocio {}).\n\n",
        spec_path, business_issue
    ));

    md.push_str("### Feature File\n");
    md.push_str(&format!("`{}`\n\n", feature_path));

    md.push_str("### Escenarios\n");
    md.push_str(&render_scenario_table(&document.scenarios));
    md.push('\n');
    md.push_str(&format!(
        "Total escenarios: {}\n\n",
        document.scenarios.len()
    ));

    md.push_str("### Comando de Ejecución Inicial\n");
    md.push_str("```bash\n");
    md.push_str(&format!(
        "cd $(dirname {path})/.. && behave features/$(basename {path})\n",
        path = feature_path
    ));
    md.push_str("```\n\n");

    md.push_str("### Objetivo\n");
    md.push_str("Centralizar la trazabilidad BDD para la funcionalidad especificada.\n\n");

    md.push_str("### Definición de Done\n");
    md.push_str("- [ ] Steps definidos para todos los escenarios.\n");
    md.push_str("- [ ] Ejecución pasa local + CI.\n");
    md.push_str(&format!(
        "- [ ] Comentario agregado en {} con referencia a este issue.\n\n",
        business_issue
    ));

    md.push_str("### Nota\n");
    md.push_str(&format!(
        "Cada escenario debe incluir tag `@JIRA:{}` en el feature file.\n",
        business_issue
    ));

    md.trim().to_string()
}

fn render_scenario_table(scenarios: &[ScenarioRecord]) -> String {
    let mut md = String::new();
    md.push_str("| # | Tipo | Nombre | Tags |\n");
    md.push_str("|---|------|--------|------|\n");
    for (idx, scenario) in scenarios.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            idx + 1,
            scenario.kind.label(),
            scenario.name,
            scenario.tags.join(" ")
        ));
    }
    md
}
