//! Scenario loading and report writing

use std::fs;
use std::io;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use drawdown_core::ScenarioConfig;

/// Read a YAML scenario file
pub fn load_scenario(path: &Path) -> color_eyre::Result<ScenarioConfig> {
    let content =
        fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let config = parse_scenario(&content)
        .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        start_year = config.start_year,
        end_year = config.end_year,
        "Scenario loaded"
    );
    Ok(config)
}

pub fn parse_scenario(yaml: &str) -> Result<ScenarioConfig, serde_saphyr::Error> {
    serde_saphyr::from_str(yaml)
}

/// Write a report using the write-then-rename pattern, so an interrupted
/// run never leaves a half-written report behind.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_core::model::MarketAssumptions;
    use tempfile::tempdir;

    const MINIMAL: &str = "\
birth_year: 1962
expenses:
  annual: 60000
taxable_accounts:
  - name: Brokerage
    balance: 500000
    basis: 300000
";

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");

        atomic_write(&path, "year;age\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "year;age\n");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");

        atomic_write(&path, "first").unwrap();
        atomic_write(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_minimal_scenario_fills_defaults() {
        let config = parse_scenario(MINIMAL).unwrap();
        assert_eq!(config.start_year, 2025);
        assert_eq!(config.end_year, 2092);
        assert_eq!(config.expenses.inflation_rate, 0.03);
        assert_eq!(config.taxes.standard_deduction, 27_700.0);
        assert_eq!(config.taxable_accounts[0].basis, Some(300_000.0));
        assert!(matches!(config.market, MarketAssumptions::Fixed { .. }));
    }

    #[test]
    fn test_load_scenario_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        fs::write(&path, MINIMAL).unwrap();

        let config = load_scenario(&path).unwrap();
        assert_eq!(config.birth_year, 1962);
        assert!(load_scenario(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_default_scenario_parses_and_builds() {
        let yaml = include_str!("../../../scenarios/default.yaml");
        let config = parse_scenario(yaml).unwrap();
        assert_eq!(
            config.taxable_accounts[0].growth_by_year.get(&2027),
            Some(&-0.25)
        );
        assert!(drawdown_core::Scenario::from_config(&config).is_ok());
    }
}
