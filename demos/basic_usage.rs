use taxon_errors::{
    Environment, ErrorShape, Failure, RecentFailures, RequestInfo, Responder, ResponderConfig,
    ResponseWriter, Result, SuccessEnvelope, TracingLogger, definitions, taxonomy_err, wrap,
};

/// Stand-in for the hosting runtime's response object.
struct StdoutWriter;

impl ResponseWriter for StdoutWriter {
    fn send_json(&mut self, status: u16, body: serde_json::Value) {
        println!("   HTTP {status} {body}");
    }
}

fn find_order(id: u64) -> Result<String> {
    if id == 0 {
        return Err(taxonomy_err!(definitions::RECORD_NOT_FOUND, "Order {} not found", id));
    }
    Ok(format!("order-{id}"))
}

async fn create_user(email: &'static str) -> std::result::Result<u64, ErrorShape> {
    if email.is_empty() {
        return Err(ErrorShape::validation(["Email is required"]));
    }
    Err(ErrorShape::duplicate_key([("email", email)]))
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let request = RequestInfo::new("GET", "/orders/0");
    let mut writer = StdoutWriter;

    println!("--- Basic Usage Example ---\n");

    // SCENARIO 1: production hides diagnostics
    println!("1. [PRODUCTION] typed error from application code:");
    let production = Responder::new(
        ResponderConfig::new(Environment::Production).with_host("api-1"),
        TracingLogger,
    );
    if let Err(err) = find_order(0) {
        production.respond(&Failure::from(err), &request, &mut writer);
    }

    // SCENARIO 2: development shows name and stack
    println!("\n2. [DEVELOPMENT] foreign runtime error:");
    let development = Responder::new(
        ResponderConfig::new(Environment::Development).with_timestamps(true),
        RecentFailures::new(16, 1024),
    );
    let failure = Failure::from(
        ErrorShape::named("TypeError").with_message("cannot read property 'id' of undefined"),
    );
    development.respond(&failure, &request, &mut writer);

    // SCENARIO 3: async handler funneled through the adapter
    println!("\n3. [ADAPTER] async handler failures:");
    let guarded = wrap(create_user);
    for email in ["a@b.com", ""] {
        let request = RequestInfo::new("POST", "/users");
        let out = futures::executor::block_on(
            guarded.call(email, |f| development.respond(&f, &request, &mut writer)),
        );
        assert!(out.is_none());
    }

    println!("\n4. [RECENT] what the ring buffer kept:");
    for entry in development.logger().get_all() {
        println!("   [{}] {} {} - {}", entry.status, entry.method, entry.path, entry.message);
    }

    println!("\n5. [SUCCESS] symmetric success envelope:");
    println!("   {}", SuccessEnvelope::ok(find_order(7).unwrap_or_default()).to_json());
}
