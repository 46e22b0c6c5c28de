//! Last resolver in the chain: a simple name exported by exactly one file of
//! the batch. Exports in languages the caller cannot link to are not
//! candidates, and names the caller imports from a scanned module are left
//! alone. Test files are ignored as candidates when resolving from
//! production code and there is more than one candidate.

use depgraph_core::entities::Dependency;
use depgraph_core::error::Result;
use depgraph_core::qualified_name::is_qualified;
use depgraph_core::resolution::ResolutionStrategy;
use std::sync::Arc;
use tracing::debug;

use super::common::{bound_to_scanned_module, normalize_target};
use super::{Resolution, Resolver, ResolverEnv};
use crate::context::ResolutionContext;
use crate::index::ExportedSymbol;

#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueExportResolver;

impl Resolver for UniqueExportResolver {
    fn name(&self) -> &'static str {
        "unique_export"
    }

    fn can_resolve(
        &self,
        _context: &ResolutionContext,
        target: &str,
        _dep: Option<&Dependency>,
        _env: &ResolverEnv<'_>,
    ) -> bool {
        let target = normalize_target(target);
        !target.is_empty() && !is_qualified(target)
    }

    fn resolve(
        &self,
        context: &mut ResolutionContext,
        target: &str,
        _dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
    ) -> Result<Option<Resolution>> {
        let target = normalize_target(target);
        if bound_to_scanned_module(context, target, env) {
            debug!(
                "{} is imported from a scanned module that does not declare it",
                target
            );
            return Ok(None);
        }

        let candidates: Vec<&ExportedSymbol> = env
            .index
            .get_exported_symbols(target)
            .iter()
            .filter(|e| e.file_id != *context.file_id())
            .filter(|e| env.language_allows(context, &e.symbol))
            .collect();

        let candidates = if candidates.len() > 1 && !env.hints.is_test_file {
            let production: Vec<&ExportedSymbol> = candidates
                .iter()
                .copied()
                .filter(|e| {
                    env.index
                        .get_file(&e.file_id)
                        .is_none_or(|f| !env.analyzer.is_test_path(&f.path))
                })
                .collect();
            if production.is_empty() {
                candidates
            } else {
                production
            }
        } else {
            candidates
        };

        match candidates.as_slice() {
            [only] => Ok(Some(Resolution::new(
                Arc::clone(&only.symbol),
                ResolutionStrategy::GlobalExport,
            ))),
            [] => Ok(None),
            many => {
                debug!(
                    "{} is exported by {} files, not guessing",
                    target,
                    many.len()
                );
                Ok(None)
            }
        }
    }
}
