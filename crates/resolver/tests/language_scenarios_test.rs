use depgraph_core::config::ResolutionConfig;
use depgraph_core::entities::{
    Dependency, DependencyType, ImportDecl, ImportedName, Language, ParsedFile, SourceFile, Symbol,
    SymbolKind,
};
use depgraph_core::entity_id::is_virtual_id;
use depgraph_core::namespace::PathAlias;
use depgraph_resolver::{DependencyGraphEngine, GraphBuildOutput, GraphQuery};
use pretty_assertions::assert_eq;

fn symbol(
    id: &str,
    file: &str,
    name: &str,
    qualified: Option<&str>,
    kind: SymbolKind,
    lines: (u32, u32),
) -> Symbol {
    Symbol {
        id: id.to_string(),
        file_id: file.to_string(),
        name: name.to_string(),
        qualified_name: qualified.map(str::to_string),
        kind,
        start_line: lines.0,
        end_line: lines.1,
        exported: true,
        visibility: None,
        signature: None,
    }
}

fn parsed(id: &str, path: &str, language: Language, symbols: Vec<Symbol>) -> ParsedFile {
    let mut file = ParsedFile::new(SourceFile::new(id, path, language));
    file.symbols = symbols;
    file
}

fn engine_with_alias(prefix: &str, directory: &str) -> DependencyGraphEngine {
    DependencyGraphEngine::new(ResolutionConfig {
        path_aliases: vec![PathAlias::new(prefix, directory)],
        ..ResolutionConfig::default()
    })
}

/// Target id of the edge leaving `from` at `line`
fn target_at<'o>(output: &'o GraphBuildOutput, from: &str, line: u32) -> Option<&'o str> {
    output
        .graph
        .edges
        .iter()
        .find(|e| e.from_id == from && e.line == line && e.dependency_type != DependencyType::Imports)
        .map(|e| e.to_id.as_str())
}

fn qualified_name_of<'o>(output: &'o GraphBuildOutput, id: &str) -> Option<&'o str> {
    output.graph.node(id)?.qualified_name.as_deref()
}

fn laravel_controller() -> ParsedFile {
    let mut controller = parsed(
        "ctrl",
        "app/Http/Controllers/UserController.php",
        Language::Php,
        vec![
            Symbol {
                signature: Some("class UserController extends Controller".to_string()),
                ..symbol(
                    "UserController",
                    "ctrl",
                    "UserController",
                    Some("App\\Http\\Controllers\\UserController"),
                    SymbolKind::Class,
                    (1, 40),
                )
            },
            symbol(
                "UserController::store",
                "ctrl",
                "store",
                Some("App\\Http\\Controllers\\UserController::store"),
                SymbolKind::Method,
                (10, 20),
            ),
        ],
    );
    controller.imports = vec![
        ImportDecl::named("Illuminate\\Routing\\Controller", vec![ImportedName::new("Controller")]),
        ImportDecl::named("Illuminate\\Http\\Request", vec![ImportedName::new("Request")]),
        ImportDecl::named("App\\Models\\User", vec![ImportedName::new("User")]),
    ];
    controller.dependencies = vec![
        Dependency::new("store", "$this->authorize", DependencyType::Calls, 12),
        Dependency::new("store", "$request->input", DependencyType::Calls, 13).with_calling_object("$request"),
        Dependency::new("store", "User::create", DependencyType::Calls, 14),
    ];
    controller
}

fn user_model(qualified: bool) -> ParsedFile {
    parsed(
        "model",
        "app/Models/User.php",
        Language::Php,
        vec![
            symbol(
                "User",
                "model",
                "User",
                qualified.then_some("App\\Models\\User"),
                SymbolKind::Class,
                (1, 30),
            ),
            symbol(
                "User::create",
                "model",
                "create",
                qualified.then_some("App\\Models\\User::create"),
                SymbolKind::Method,
                (5, 10),
            ),
        ],
    )
}

#[test]
fn test_laravel_controller() {
    let output = DependencyGraphEngine::default().build_graph(&[laravel_controller(), user_model(true)]);
    let from = "UserController::store";

    let authorize = target_at(&output, from, 12).unwrap();
    assert!(is_virtual_id(authorize));
    assert_eq!(
        qualified_name_of(&output, authorize),
        Some("laravel::Controller::authorize")
    );

    let input = target_at(&output, from, 13).unwrap();
    assert!(is_virtual_id(input));
    assert_eq!(qualified_name_of(&output, input), Some("laravel::Request::input"));

    assert_eq!(target_at(&output, from, 14), Some("User::create"));
    assert_eq!(output.stats.virtual_symbols, 2);
    assert_eq!(output.stats.resolution_rate(), 1.0);
}

#[test]
fn test_php_class_autoloaded_through_path_alias() {
    let mut engine = engine_with_alias("App\\", "app/");
    let output = engine.build_graph(&[laravel_controller(), user_model(false)]);
    assert_eq!(target_at(&output, "UserController::store", 14), Some("User::create"));
    assert_eq!(output.stats.resolved_by_chain, 3);
    assert_eq!(output.stats.resolved_by_fallback, 0);

    // Without the alias the chain declines and the member name lookup finds it
    let output = DependencyGraphEngine::default().build_graph(&[laravel_controller(), user_model(false)]);
    assert_eq!(target_at(&output, "UserController::store", 14), Some("User::create"));
    assert_eq!(output.stats.resolved_by_chain, 2);
    assert_eq!(output.stats.resolved_by_fallback, 1);
}

fn payment_services() -> Vec<ParsedFile> {
    let gateway = parsed(
        "gateway",
        "src/Services/IPaymentGateway.cs",
        Language::CSharp,
        vec![
            symbol(
                "IPaymentGateway",
                "gateway",
                "IPaymentGateway",
                Some("Shop.Services.IPaymentGateway"),
                SymbolKind::Interface,
                (1, 10),
            ),
            symbol(
                "IPaymentGateway.Charge",
                "gateway",
                "Charge",
                Some("Shop.Services.IPaymentGateway.Charge"),
                SymbolKind::Method,
                (3, 3),
            ),
        ],
    );

    let mut stripe = parsed(
        "stripe",
        "src/Services/StripeGateway.cs",
        Language::CSharp,
        vec![
            symbol(
                "StripeGateway",
                "stripe",
                "StripeGateway",
                Some("Shop.Services.StripeGateway"),
                SymbolKind::Class,
                (1, 20),
            ),
            symbol(
                "StripeGateway.Charge",
                "stripe",
                "Charge",
                Some("Shop.Services.StripeGateway.Charge"),
                SymbolKind::Method,
                (5, 10),
            ),
        ],
    );
    stripe.dependencies.push(Dependency::new(
        "StripeGateway",
        "IPaymentGateway",
        DependencyType::Implements,
        1,
    ));

    let mut controller = parsed(
        "checkout",
        "src/Controllers/CheckoutController.cs",
        Language::CSharp,
        vec![
            symbol(
                "CheckoutController",
                "checkout",
                "CheckoutController",
                Some("Shop.Controllers.CheckoutController"),
                SymbolKind::Class,
                (1, 40),
            ),
            Symbol {
                signature: Some("private readonly IPaymentGateway _gateway;".to_string()),
                ..symbol(
                    "CheckoutController._gateway",
                    "checkout",
                    "_gateway",
                    Some("Shop.Controllers.CheckoutController._gateway"),
                    SymbolKind::Field,
                    (3, 3),
                )
            },
            symbol(
                "CheckoutController.Pay",
                "checkout",
                "Pay",
                Some("Shop.Controllers.CheckoutController.Pay"),
                SymbolKind::Method,
                (10, 20),
            ),
        ],
    );
    controller.imports.push(ImportDecl::named("Shop.Services", Vec::new()));
    controller
        .dependencies
        .push(Dependency::new("Pay", "_gateway.Charge", DependencyType::Calls, 15));

    vec![gateway, stripe, controller]
}

#[test]
fn test_csharp_field_typed_call_and_implementations() {
    let output = DependencyGraphEngine::default().build_graph(&payment_services());

    assert_eq!(
        target_at(&output, "CheckoutController.Pay", 15),
        Some("IPaymentGateway.Charge")
    );
    assert_eq!(
        target_at(&output, "StripeGateway", 1),
        Some("IPaymentGateway")
    );

    let query = GraphQuery::new(&output.graph);
    let implementations: Vec<&str> = query
        .implementations("IPaymentGateway")
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(implementations, vec!["StripeGateway"]);
    let callers: Vec<&str> = query
        .callers("IPaymentGateway.Charge")
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(callers, vec!["CheckoutController.Pay"]);
}

fn vue_cart() -> Vec<ParsedFile> {
    let store = parsed(
        "store",
        "src/stores/cart.ts",
        Language::TypeScript,
        vec![
            symbol("useCartStore", "store", "useCartStore", None, SymbolKind::Function, (1, 30)),
            symbol("cart.addItem", "store", "addItem", None, SymbolKind::Function, (5, 10)),
        ],
    );

    let mut component = parsed(
        "component",
        "src/components/Cart.vue",
        Language::Vue,
        vec![symbol("Cart.setup", "component", "setup", None, SymbolKind::Function, (1, 20))],
    );
    component.imports = vec![
        ImportDecl::named("vue", vec![ImportedName::new("ref")]),
        ImportDecl::named("@/stores/cart", vec![ImportedName::new("useCartStore")]),
    ];
    component.dependencies = vec![
        Dependency::new("setup", "useCartStore", DependencyType::Calls, 2),
        Dependency::new("setup", "ref", DependencyType::Calls, 3),
        Dependency::new("setup", "cartStore.addItem", DependencyType::Calls, 5),
    ];

    vec![store, component]
}

#[test]
fn test_vue_component_with_store_and_framework_calls() {
    let output = engine_with_alias("@/", "src/").build_graph(&vue_cart());
    let from = "Cart.setup";

    assert_eq!(target_at(&output, from, 2), Some("useCartStore"));
    assert!(output.graph.edges.iter().any(|e| e.from_id == from
        && e.to_id == "useCartStore"
        && e.dependency_type == DependencyType::Imports));

    let reactive = target_at(&output, from, 3).unwrap();
    assert_eq!(qualified_name_of(&output, reactive), Some("vue::ref"));

    assert_eq!(target_at(&output, from, 5), Some("cart.addItem"));
    assert_eq!(output.graph.edges.len(), 4);
}

#[test]
fn test_unresolved_alias_leaves_store_convention_working() {
    let output = DependencyGraphEngine::default().build_graph(&vue_cart());
    let from = "Cart.setup";

    // `@/stores/cart` cannot be mapped to a file, but the factory is the only export
    assert_eq!(target_at(&output, from, 2), Some("useCartStore"));
    assert_eq!(target_at(&output, from, 5), Some("cart.addItem"));
}
