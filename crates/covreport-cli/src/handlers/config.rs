//! Config command handler

use crate::commands::{ConfigArgs, ReportArgs};
use crate::config::CliConfig;
use crate::error::CliResult;
use covreport::ReportConfig;

/// Report settings: command-line flags over the config file over defaults
pub fn resolve_report_config(cli: &CliConfig, args: &ReportArgs) -> CliResult<ReportConfig> {
    let cwd = std::env::current_dir()?;
    let base = cli.base_report_config(&cwd)?;
    Ok(args.apply(base))
}

/// Text printed by `config --show`
pub fn render_config(cli: &CliConfig, report: &ReportConfig) -> CliResult<String> {
    let mut text = String::from("# covreport configuration\n");
    text.push_str(&format!("# verbosity: {:?}\n", cli.verbosity));
    text.push_str(&format!("# color: {:?}\n", cli.color));
    text.push_str(&format!("# log format: {:?}\n", cli.log_format));
    text.push_str(&format!(
        "# resolved project dir: {}\n",
        report.resolved_project_dir()
    ));
    text.push_str(&report.to_yaml()?);
    Ok(text)
}

/// Execute the config command
pub fn execute_config(cli: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    if !args.show {
        println!("Use `covreport config --show` to print the resolved configuration.");
        return Ok(());
    }
    let report = resolve_report_config(cli, &args.report)?;
    print!("{}", render_config(cli, &report)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_render_config_is_yaml_with_header() {
        let cli = CliConfig::new().with_verbosity(Verbosity::Verbose);
        let report = ReportConfig::new()
            .with_output_dir("reports")
            .with_project_dir("/work");
        let text = render_config(&cli, &report).unwrap();
        assert!(text.starts_with("# covreport configuration\n# verbosity: Verbose\n"));
        assert!(text.contains("# resolved project dir: /work\n"));
        assert!(text.contains("output_dir: reports"));

        let yaml: String = text.lines().filter(|l| !l.starts_with('#')).map(|l| format!("{l}\n")).collect();
        assert_eq!(ReportConfig::from_yaml(&yaml).unwrap(), report);
    }
}
