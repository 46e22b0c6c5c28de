use depgraph_core::config::ResolutionConfig;
use depgraph_core::entities::{
    Dependency, DependencyType, ExportDecl, ImportDecl, ImportedName, Language, ParsedFile,
    SourceFile, Symbol, SymbolKind,
};
use depgraph_core::resolution::{Confidence, ResolutionStrategy};
use depgraph_resolver::{DependencyGraphEngine, GraphBuildOutput};
use pretty_assertions::assert_eq;

fn symbol(id: &str, file: &str, name: &str, kind: SymbolKind, lines: (u32, u32)) -> Symbol {
    Symbol {
        id: id.to_string(),
        file_id: file.to_string(),
        name: name.to_string(),
        qualified_name: None,
        kind,
        start_line: lines.0,
        end_line: lines.1,
        exported: false,
        visibility: None,
        signature: None,
    }
}

fn exported(id: &str, file: &str, name: &str, kind: SymbolKind, lines: (u32, u32)) -> Symbol {
    Symbol {
        exported: true,
        ..symbol(id, file, name, kind, lines)
    }
}

fn parsed(id: &str, path: &str, language: Language, symbols: Vec<Symbol>) -> ParsedFile {
    let mut file = ParsedFile::new(SourceFile::new(id, path, language));
    file.symbols = symbols;
    file
}

fn build(files: &[ParsedFile]) -> GraphBuildOutput {
    DependencyGraphEngine::default().build_graph(files)
}

fn edges(output: &GraphBuildOutput) -> Vec<(&str, &str, DependencyType)> {
    output
        .graph
        .edges
        .iter()
        .map(|e| (e.from_id.as_str(), e.to_id.as_str(), e.dependency_type))
        .collect()
}

/// Two repositories declaring `save`, neither exported
fn repositories() -> Vec<ParsedFile> {
    vec![
        parsed(
            "orders",
            "src/orders.ts",
            Language::TypeScript,
            vec![
                symbol("OrderRepo", "orders", "OrderRepo", SymbolKind::Class, (1, 20)),
                symbol("OrderRepo.save", "orders", "save", SymbolKind::Method, (5, 8)),
            ],
        ),
        parsed(
            "users",
            "src/users.ts",
            Language::TypeScript,
            vec![
                symbol("UserRepo", "users", "UserRepo", SymbolKind::Class, (1, 20)),
                symbol("UserRepo.save", "users", "save", SymbolKind::Method, (5, 8)),
            ],
        ),
    ]
}

fn caller(dependency: Dependency) -> ParsedFile {
    let mut file = parsed(
        "app",
        "src/app.ts",
        Language::TypeScript,
        vec![symbol("main", "app", "main", SymbolKind::Function, (1, 10))],
    );
    file.dependencies.push(dependency);
    file
}

#[test]
fn test_repeated_passes_are_identical() {
    let mut files = repositories();
    files.push(caller(
        Dependency::new("main", "save", DependencyType::Calls, 4).with_resolved_class("UserRepo"),
    ));
    let mut vue = parsed(
        "view",
        "src/App.vue",
        Language::Vue,
        vec![symbol("setup", "view", "setup", SymbolKind::Function, (1, 9))],
    );
    vue.imports.push(ImportDecl::named("vue", vec![ImportedName::new("computed")]));
    vue.dependencies.push(Dependency::new("setup", "computed", DependencyType::Calls, 3));
    vue.dependencies.push(Dependency::new("setup", "save", DependencyType::References, 5));
    files.push(vue);

    let first = serde_json::to_string(&build(&files)).unwrap();
    let second = serde_json::to_string(&build(&files)).unwrap();
    assert_eq!(first, second);

    // Reusing one engine (and its virtual symbol cache) gives the same graph
    let mut engine = DependencyGraphEngine::default();
    let reused_first = serde_json::to_string(&engine.build_graph(&files)).unwrap();
    let reused_second = serde_json::to_string(&engine.build_graph(&files)).unwrap();
    assert_eq!(reused_first, first);
    assert_eq!(reused_second, first);
}

#[test]
fn test_local_declaration_wins_over_global_exports() {
    let mut app = parsed(
        "app",
        "src/app.ts",
        Language::TypeScript,
        vec![
            symbol("main", "app", "main", SymbolKind::Function, (1, 10)),
            symbol("app.format", "app", "format", SymbolKind::Function, (12, 14)),
        ],
    );
    app.dependencies.push(Dependency::new("main", "format", DependencyType::Calls, 3));
    let files = vec![
        app,
        parsed(
            "a",
            "src/a.ts",
            Language::TypeScript,
            vec![exported("a.format", "a", "format", SymbolKind::Function, (1, 3))],
        ),
        parsed(
            "b",
            "src/b.ts",
            Language::TypeScript,
            vec![exported("b.format", "b", "format", SymbolKind::Function, (1, 3))],
        ),
    ];

    let output = build(&files);
    assert_eq!(edges(&output), vec![("main", "app.format", DependencyType::Calls)]);
}

#[test]
fn test_explicit_import_wins_over_other_exports() {
    let mut app = parsed(
        "app",
        "src/app.ts",
        Language::TypeScript,
        vec![symbol("main", "app", "main", SymbolKind::Function, (1, 10))],
    );
    app.imports.push(ImportDecl::named("./utils/dates", vec![ImportedName::new("format")]));
    app.dependencies.push(Dependency::new("main", "format", DependencyType::Calls, 3));

    let mut dates = parsed(
        "dates",
        "src/utils/dates.ts",
        Language::TypeScript,
        vec![exported("dates.format", "dates", "format", SymbolKind::Function, (1, 3))],
    );
    dates.exports.push(ExportDecl::new("format"));
    let strings = parsed(
        "strings",
        "src/utils/strings.ts",
        Language::TypeScript,
        vec![exported("strings.format", "strings", "format", SymbolKind::Function, (1, 3))],
    );

    let output = build(&[app, dates, strings]);
    assert_eq!(
        edges(&output),
        vec![
            ("main", "dates.format", DependencyType::Calls),
            ("main", "dates.format", DependencyType::Imports),
        ]
    );
}

#[test]
fn test_import_from_scanned_module_is_not_rebound_by_export_name() {
    let mut app = parsed(
        "app",
        "src/app.ts",
        Language::TypeScript,
        vec![symbol("main", "app", "main", SymbolKind::Function, (1, 10))],
    );
    app.imports.push(ImportDecl::named("./utils", vec![ImportedName::new("formatDate")]));
    app.dependencies.push(Dependency::new("main", "formatDate", DependencyType::Calls, 3));
    // Barrel module whose re-export the parser did not record
    let barrel = parsed("utils", "src/utils/index.ts", Language::TypeScript, Vec::new());
    let legacy = parsed(
        "legacy",
        "src/legacy/format.ts",
        Language::TypeScript,
        vec![exported("legacy.formatDate", "legacy", "formatDate", SymbolKind::Function, (1, 3))],
    );

    let output = build(&[app, barrel, legacy]);
    assert_eq!(output.stats.resolved_by_chain, 0);
    assert_eq!(
        edges(&output),
        vec![("main", "legacy.formatDate", DependencyType::Calls)]
    );
    assert_eq!(
        output.graph.edges[0].metadata.confidence(),
        Some(Confidence::Heuristic)
    );
}

#[test]
fn test_ambiguous_call_without_hint_produces_no_edge() {
    let mut files = repositories();
    files.push(caller(Dependency::new("main", "save", DependencyType::Calls, 4)));

    let output = build(&files);
    assert!(output.graph.edges.is_empty());
    assert_eq!(output.stats.ambiguous_dropped, 1);
    assert_eq!(output.stats.resolved_by_fallback, 0);
}

#[test]
fn test_resolved_class_selects_the_matching_owner() {
    let mut files = repositories();
    files.push(caller(
        Dependency::new("main", "save", DependencyType::Calls, 4).with_resolved_class("UserRepo"),
    ));

    let output = build(&files);
    assert_eq!(edges(&output), vec![("main", "UserRepo.save", DependencyType::Calls)]);
    assert_eq!(output.stats.resolved_by_fallback, 1);
    assert_eq!(output.stats.ambiguous_first_pick, 0);
    assert_eq!(output.graph.edges[0].metadata.resolved_class.as_deref(), Some("UserRepo"));
    assert_eq!(output.graph.edges[0].metadata.strategy, Some(ResolutionStrategy::Fallback));
    assert_eq!(output.graph.edges[0].metadata.confidence(), Some(Confidence::Heuristic));
}

#[test]
fn test_unmatched_hint_picks_first_candidate() {
    let mut files = repositories();
    files.push(caller(
        Dependency::new("main", "save", DependencyType::Calls, 4).with_qualified_context("Cache"),
    ));

    let output = build(&files);
    assert_eq!(edges(&output), vec![("main", "OrderRepo.save", DependencyType::Calls)]);
    assert_eq!(output.stats.ambiguous_first_pick, 1);
}

#[test]
fn test_self_loops_only_for_calls() {
    let mut file = parsed(
        "tree",
        "src/tree.ts",
        Language::TypeScript,
        vec![symbol("walk", "tree", "walk", SymbolKind::Function, (1, 9))],
    );
    file.dependencies.push(Dependency::new("walk", "walk", DependencyType::Calls, 4));
    file.dependencies.push(Dependency::new("walk", "walk", DependencyType::References, 6));

    let output = build(&[file]);
    assert_eq!(edges(&output), vec![("walk", "walk", DependencyType::Calls)]);
    assert_eq!(output.stats.self_loops_suppressed, 1);
}

fn php_calling_typescript() -> Vec<ParsedFile> {
    let mut helpers = parsed(
        "helpers",
        "app/Support/helpers.php",
        Language::Php,
        vec![symbol("report", "helpers", "report", SymbolKind::Function, (1, 5))],
    );
    helpers.dependencies.push(Dependency::new("report", "renderChart", DependencyType::Calls, 2));
    let chart = parsed(
        "chart",
        "resources/js/chart.ts",
        Language::TypeScript,
        vec![exported("renderChart", "chart", "renderChart", SymbolKind::Function, (1, 20))],
    );
    vec![helpers, chart]
}

#[test]
fn test_cross_language_edges_are_filtered() {
    let output = build(&php_calling_typescript());
    assert!(output.graph.edges.is_empty());
    assert!(output.stats.cross_language_suppressed >= 1);
}

#[test]
fn test_cross_language_filter_can_be_disabled() {
    let config = ResolutionConfig {
        filter_cross_language: false,
        ..ResolutionConfig::default()
    };
    let output = DependencyGraphEngine::new(config).build_graph(&php_calling_typescript());
    assert!(edges(&output).contains(&("report", "renderChart", DependencyType::Calls)));
    assert_eq!(output.stats.cross_language_suppressed, 0);
}

#[test]
fn test_same_language_target_wins_over_foreign_export() {
    let mut controller = parsed(
        "ctl",
        "app/Http/Controllers/InvoiceController.php",
        Language::Php,
        vec![symbol("show", "ctl", "show", SymbolKind::Method, (1, 9))],
    );
    controller.dependencies.push(Dependency::new("show", "format_money", DependencyType::Calls, 4));
    let helpers = parsed(
        "helpers",
        "app/helpers.php",
        Language::Php,
        vec![symbol("helpers.format_money", "helpers", "format_money", SymbolKind::Function, (1, 5))],
    );
    let money = parsed(
        "money",
        "resources/js/money.ts",
        Language::TypeScript,
        vec![exported("money.format_money", "money", "format_money", SymbolKind::Function, (1, 5))],
    );

    let output = build(&[controller, helpers, money]);
    assert_eq!(
        edges(&output),
        vec![("show", "helpers.format_money", DependencyType::Calls)]
    );
    assert_eq!(output.stats.resolved_by_chain, 0);
    assert_eq!(output.stats.resolved_by_fallback, 1);
    assert_eq!(output.stats.cross_language_suppressed, 1);
}

#[test]
fn test_ids_starting_with_virtual_are_ordinary_symbols() {
    let mut files = php_calling_typescript();
    files[1].symbols = vec![exported(
        "virtualChart.ts#renderChart",
        "chart",
        "renderChart",
        SymbolKind::Function,
        (1, 20),
    )];
    let output = build(&files);
    assert!(output.graph.edges.is_empty());
    assert_eq!(output.stats.cross_language_suppressed, 1);
    assert_eq!(output.stats.virtual_symbols, 0);
}

#[test]
fn test_front_end_languages_are_compatible() {
    let mut view = parsed(
        "view",
        "src/Chart.vue",
        Language::Vue,
        vec![symbol("mounted", "view", "mounted", SymbolKind::Function, (1, 5))],
    );
    view.dependencies.push(Dependency::new("mounted", "renderChart", DependencyType::Calls, 2));
    let chart = parsed(
        "chart",
        "src/chart.js",
        Language::JavaScript,
        vec![exported("renderChart", "chart", "renderChart", SymbolKind::Function, (1, 20))],
    );

    let output = build(&[view, chart]);
    assert!(edges(&output).contains(&("mounted", "renderChart", DependencyType::Calls)));
}

#[test]
fn test_duplicate_dependencies_collapse_to_one_edge() {
    let mut file = parsed(
        "app",
        "src/app.ts",
        Language::TypeScript,
        vec![
            symbol("main", "app", "main", SymbolKind::Function, (1, 10)),
            symbol("helper", "app", "helper", SymbolKind::Function, (12, 14)),
        ],
    );
    let dep = Dependency::new("main", "helper", DependencyType::Calls, 3);
    file.dependencies.push(dep.clone());
    file.dependencies.push(dep);
    file.dependencies.push(Dependency::new("main", "helper", DependencyType::Calls, 5));

    let output = build(&[file]);
    assert_eq!(
        edges(&output),
        vec![
            ("main", "helper", DependencyType::Calls),
            ("main", "helper", DependencyType::Calls),
        ]
    );
    assert_eq!(output.graph.edges[0].line, 3);
    assert_eq!(output.graph.edges[0].metadata.strategy, Some(ResolutionStrategy::LocalScope));
    assert_eq!(output.graph.edges[1].line, 5);
    assert_eq!(output.stats.duplicates_removed, 1);
}

fn base_and_derived(derived_declares_run: bool) -> Vec<ParsedFile> {
    let base = parsed(
        "a",
        "src/base.ts",
        Language::TypeScript,
        vec![
            symbol("Base", "a", "Base", SymbolKind::Class, (1, 10)),
            symbol("Base.run", "a", "run", SymbolKind::Method, (2, 4)),
        ],
    );

    let mut derived_symbols = vec![
        symbol("Derived", "b", "Derived", SymbolKind::Class, (1, 30)),
        symbol("Derived.main", "b", "main", SymbolKind::Method, (10, 15)),
    ];
    if derived_declares_run {
        derived_symbols.push(symbol("Derived.run", "b", "run", SymbolKind::Method, (3, 6)));
    }
    let mut derived = parsed("b", "src/derived.ts", Language::TypeScript, derived_symbols);
    derived.dependencies.push(Dependency::new("Derived", "Base", DependencyType::Implements, 1));
    derived.dependencies.push(Dependency::new("main", "Base.run", DependencyType::Calls, 12));

    vec![base, derived]
}

#[test]
fn test_interface_call_resolves_to_implementation() {
    let output = build(&base_and_derived(true));
    assert_eq!(
        edges(&output),
        vec![
            ("Derived", "Base", DependencyType::Implements),
            ("Derived.main", "Derived.run", DependencyType::Calls),
        ]
    );
}

#[test]
fn test_interface_call_without_override_resolves_to_base() {
    let output = build(&base_and_derived(false));
    assert_eq!(
        edges(&output),
        vec![
            ("Derived", "Base", DependencyType::Implements),
            ("Derived.main", "Base.run", DependencyType::Calls),
        ]
    );
}

#[test]
fn test_unanchored_and_unknown_targets_are_counted() {
    let mut file = parsed(
        "app",
        "src/app.ts",
        Language::TypeScript,
        vec![symbol("main", "app", "main", SymbolKind::Function, (1, 10))],
    );
    file.dependencies.push(Dependency::new("ghost", "main", DependencyType::Calls, 2));
    file.dependencies.push(Dependency::new("main", "nowhere", DependencyType::Calls, 3));

    let output = build(&[file]);
    assert!(output.graph.edges.is_empty());
    assert_eq!(output.stats.dependencies_seen, 2);
    assert_eq!(output.stats.unanchored, 1);
    assert_eq!(output.stats.declined, 1);
    assert_eq!(output.stats.resolution_rate(), 0.0);
}

#[test]
fn test_reset_clears_virtual_symbols() {
    let mut view = parsed(
        "view",
        "src/App.vue",
        Language::Vue,
        vec![symbol("setup", "view", "setup", SymbolKind::Function, (1, 9))],
    );
    view.imports.push(ImportDecl::named("vue", vec![ImportedName::new("ref")]));
    view.dependencies.push(Dependency::new("setup", "ref", DependencyType::Calls, 3));

    let mut engine = DependencyGraphEngine::default();
    let output = engine.build_graph(&[view]);
    assert_eq!(output.stats.virtual_symbols, 1);
    assert_eq!(engine.resolver().virtual_symbols().len(), 1);

    engine.reset();
    assert!(engine.resolver().virtual_symbols().is_empty());
    assert!(engine.resolver().index().is_empty());
}

#[test]
fn test_persistence_projection_falls_back_to_target_qualified_name() {
    let mut file = parsed(
        "app",
        "src/app.ts",
        Language::TypeScript,
        vec![
            symbol("main", "app", "main", SymbolKind::Function, (1, 10)),
            Symbol {
                qualified_name: Some("app.helper".to_string()),
                ..symbol("helper", "app", "helper", SymbolKind::Function, (12, 14))
            },
        ],
    );
    file.dependencies.push(Dependency::new("main", "helper", DependencyType::Calls, 3));

    let output = build(&[file]);
    let rows = output.graph.to_create_dependencies();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].qualified_name.as_deref(), Some("app.helper"));
    assert_eq!(rows[0].line_number, 3);
}
