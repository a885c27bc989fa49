use serde_json::{json, Map, Value};
use std::io::{self, BufRead};
use std::sync::Arc;
use tracking_session::api::bridge::{
    METHOD_IS_TRACKING, METHOD_START, METHOD_STATUS, METHOD_STOP, METHOD_UPDATE_SETTINGS,
};
use tracking_session::{
    handle_call, init_logging, ConfigurationManager, DeadlineWakeLock, JsonLinesSink, MethodCall,
    ServiceHandle, SimulatedProvider, TracingForeground, TrackingContext, TrackingService,
};

// Prague, Old Town Square
const DEMO_LATITUDE: f64 = 50.0875;
const DEMO_LONGITUDE: f64 = 14.4213;

#[derive(Debug, PartialEq)]
enum Input {
    Call(MethodCall),
    Attach,
    Detach,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }
    if line.starts_with('{') {
        return serde_json::from_str(line)
            .map(Input::Call)
            .map_err(|e| format!("malformed method call: {}", e));
    }

    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let input = match command {
        "start" => Input::Call(MethodCall::new(METHOD_START)),
        "stop" => Input::Call(MethodCall::new(METHOD_STOP)),
        "running" => Input::Call(MethodCall::new(METHOD_IS_TRACKING)),
        "status" => Input::Call(MethodCall::new(METHOD_STATUS)),
        "update" => {
            let mut arguments = Map::new();
            for pair in words {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("expected key=value, got '{}'", pair))?;
                let key = match key {
                    "interval" => "intervalMs",
                    "fastest" => "fastestIntervalMs",
                    "wait" => "maxWaitTimeMs",
                    "displacement" => "smallestDisplacementM",
                    "priority" => "priority",
                    other => return Err(format!("unknown setting '{}'", other)),
                };
                let value: Value = serde_json::from_str(value)
                    .map_err(|_| format!("'{}' is not a number", value))?;
                arguments.insert(key.to_string(), value);
            }
            Input::Call(MethodCall::new(METHOD_UPDATE_SETTINGS).with_arguments(Value::Object(arguments)))
        }
        "attach" => Input::Attach,
        "detach" => Input::Detach,
        "quit" | "exit" => Input::Quit,
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(input)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [config.json]", program);
    eprintln!("Commands (one per line on stdin):");
    eprintln!("  start | stop | running | status");
    eprintln!("  update interval=<ms> fastest=<ms> wait=<ms> displacement=<m> priority=<100|102|104|105>");
    eprintln!("  attach | detach | quit");
    eprintln!("  {{\"method\": \"startGPSTracking\", \"arguments\": {{...}}}}");
}

fn attach_stdout(handle: &ServiceHandle) {
    handle.attach_sink(Box::new(JsonLinesSink::new(io::stdout())));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("tracking-session", |s| s.as_str());

    if args.len() > 2 || args.get(1).is_some_and(|a| a == "--help") {
        print_usage(program);
        return Err("Invalid arguments".into());
    }

    let manager = match args.get(1) {
        Some(path) => ConfigurationManager::from_file(path)?,
        None => ConfigurationManager::new(),
    };
    let config = manager.config().clone();

    if let Err(e) = init_logging(config.log_level) {
        eprintln!("logging unavailable: {}", e);
    }

    let context = Arc::new(TrackingContext::new());
    let handle = TrackingService::spawn(
        SimulatedProvider::new(DEMO_LATITUDE, DEMO_LONGITUDE),
        DeadlineWakeLock::default(),
        TracingForeground::new(),
        &config,
        context,
    )?;
    attach_stdout(&handle);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_line(&line) {
            Ok(Input::Call(call)) => {
                let result = handle_call(&handle, &call);
                println!("{}", serde_json::to_string(&result)?);
            }
            Ok(Input::Attach) => {
                attach_stdout(&handle);
                println!("{}", json!({ "status": "success", "result": "attached" }));
            }
            Ok(Input::Detach) => {
                handle.detach_sink();
                println!("{}", json!({ "status": "success", "result": "detached" }));
            }
            Ok(Input::Quit) => break,
            Ok(Input::Empty) => {}
            Err(message) => {
                println!("{}", json!({ "status": "error", "code": "INVALID_REQUEST", "message": message }));
            }
        }
    }

    handle.shutdown();
    Ok(())
}
