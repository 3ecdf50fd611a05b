use crate::acquisition::{AcquisitionRequest, RunMode};
use crate::cli::args::Command;
use crate::cli::params::{FetchParams, ListParams};
use crate::config::{Config, load_config};
use crate::error::LoopFetchError;
use crate::package_set::Selection;
use crate::repository::{ContentYear, ManifestStore, Product};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Fetch(FetchParams),
    List(ListParams),
}

fn resolve_selection(
    store: &ManifestStore,
    product: Product,
    years: Vec<String>,
) -> Result<Selection, LoopFetchError> {
    let mut resolved_years = years
        .iter()
        .map(|year| {
            store
                .year(year)
                .ok_or_else(|| LoopFetchError::CliArgumentValidation {
                    details: format!("No content is registered for year {year}."),
                })
        })
        .collect::<Result<Vec<ContentYear>, _>>()?;
    resolved_years.sort();
    resolved_years.dedup();

    if !store.valid_products().contains(&product) {
        return Err(LoopFetchError::CliArgumentValidation {
            details: format!("No content is registered for {product}."),
        });
    }

    Ok(Selection {
        product,
        years: resolved_years,
    })
}

fn resolve_base_url(app_config: &Config) -> Result<Url, LoopFetchError> {
    Url::parse(&app_config.base_url).map_err(|e| LoopFetchError::InvalidUrl {
        url: app_config.base_url.clone(),
        reason: e.to_string(),
    })
}

/// Scratch directory for list-only runs, unique per process so it never
/// overlaps a real download location.
pub fn list_scratch_root(product: Product) -> PathBuf {
    std::env::temp_dir().join(format!(
        "loopfetch-list-{}-{}",
        product.id(),
        std::process::id()
    ))
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, LoopFetchError> {
    let store = ManifestStore::builtin();

    match command {
        Command::Fetch {
            config_path,
            product,
            years,
            output_dir,
        } => {
            let app_config = load_config(config_path.as_deref())?;
            let base_url = resolve_base_url(&app_config)?;
            let selection = resolve_selection(&store, product, years)?;

            let output_root = output_dir
                .map(PathBuf::from)
                .or_else(|| app_config.output_dir.clone())
                .unwrap_or_else(std::env::temp_dir)
                .join(product.id());

            Ok(ResolvedCommand::Fetch(FetchParams {
                app_config,
                base_url,
                request: AcquisitionRequest {
                    selection,
                    output_root,
                    mode: RunMode::Download,
                },
            }))
        }
        Command::List {
            config_path,
            product,
            years,
            json,
        } => {
            let app_config = load_config(config_path.as_deref())?;
            let base_url = resolve_base_url(&app_config)?;
            let selection = resolve_selection(&store, product, years)?;

            Ok(ResolvedCommand::List(ListParams {
                app_config,
                base_url,
                request: AcquisitionRequest {
                    selection,
                    output_root: list_scratch_root(product),
                    mode: RunMode::ListOnly,
                },
                json,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_output_root_nests_product() {
        let command = Command::Fetch {
            config_path: None,
            product: Product::LogicPro,
            years: vec!["2016".to_string(), "2013".to_string(), "2016".to_string()],
            output_dir: Some("/srv/loops".to_string()),
        };

        let ResolvedCommand::Fetch(params) = resolve_command(command).unwrap() else {
            panic!("expected a fetch command");
        };

        assert_eq!(
            params.request.output_root,
            PathBuf::from("/srv/loops").join("logicpro")
        );
        assert_eq!(params.request.mode, RunMode::Download);
        assert_eq!(
            params.request.selection.years,
            vec![ContentYear::new("2013"), ContentYear::new("2016")]
        );
    }

    #[test]
    fn test_list_uses_scratch_root() {
        let command = Command::List {
            config_path: None,
            product: Product::GarageBand,
            years: vec![],
            json: true,
        };

        let ResolvedCommand::List(params) = resolve_command(command).unwrap() else {
            panic!("expected a list command");
        };

        assert!(params.request.output_root.starts_with(std::env::temp_dir()));
        assert_eq!(params.request.mode, RunMode::ListOnly);
        assert!(params.request.selection.years.is_empty());
        assert!(params.json);
    }

    #[test]
    fn test_unknown_year_is_rejected() {
        let command = Command::Fetch {
            config_path: None,
            product: Product::GarageBand,
            years: vec!["1999".to_string()],
            output_dir: None,
        };

        assert!(matches!(
            resolve_command(command),
            Err(LoopFetchError::CliArgumentValidation { .. })
        ));
    }
}
