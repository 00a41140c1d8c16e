use rest_request::{
    Completion, OutgoingRequest, Session,
    config::{Config, ConfigError},
    transport::HyperTransport,
};
use serde_json::json;
use std::env;
use tokio::{runtime, task::LocalSet};

fn main() -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    let url = env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:3000/".to_owned());

    let session = Session::with_config(HyperTransport::new(), config);

    // blocking
    let mut request = OutgoingRequest::new(url.as_str());
    request.add_query_parameter("q", "caf\u{e9} au lait");
    match request.call(&session) {
        Ok(completion) => report(completion),
        Err(err) => eprintln!("request failed: {err}"),
    }

    // asynchronous, the same url again so a validator may come back as 304
    let rt = runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");
    let local = LocalSet::new();

    local.block_on(&rt, async {
        let mut request = OutgoingRequest::new(url.as_str());
        request
            .set_method("POST")
            .set_entity(json!({ "name": "j doe", "tags": ["a", "b"] }));

        if let Err(err) = request.execute(&session, report) {
            eprintln!("request failed: {err}");
        }
    });
    rt.block_on(local);

    Ok(())
}

fn report(completion: Completion) {
    println!("> {} {}", completion.status, completion.response.url());
    match &completion.entity {
        Ok(Some(entity)) => println!("{entity:?}"),
        Ok(None) => println!("{}", completion.response.text()),
        Err(err) => eprintln!("invalid entity: {err}"),
    }
}
