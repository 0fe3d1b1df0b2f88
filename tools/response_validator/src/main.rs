use azure_tags_core::validator::ResponseValidator;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: response_validator <path/to/eval_response.json>");
        std::process::exit(2);
    }
    let path = std::path::Path::new(&args[1]);

    let v = ResponseValidator::new();
    match v.validate_json_file(path) {
        Ok(summary) => {
            match serde_json::to_string_pretty(&summary) {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    eprintln!("validator error: {}", e);
                    std::process::exit(1);
                }
            }
            if summary.passed() {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("validator error: {}", e.chain());
            std::process::exit(1);
        }
    }
}
