use std::env;
use std::io::{self, Write};
use std::process;

/// Print the leading bytes of a file, up to the first NUL, to stdout.
///
/// Usage: `head [PATH] [MAX_BYTES]`. The path defaults to `data.txt` and the
/// bound to 1000 bytes. Set `RUST_LOG=debug` to see the mapping being made.
fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "data.txt".to_owned());
    let max_bytes = match args.next().map(|arg| arg.parse::<usize>()) {
        None => 1000,
        Some(Ok(max_bytes)) => max_bytes,
        Some(Err(err)) => {
            eprintln!("invalid byte count: {}", err);
            process::exit(2);
        }
    };

    if let Err(err) = run(&path, max_bytes) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(path: &str, max_bytes: usize) -> io::Result<()> {
    let view = mmap_view::open_view(path, max_bytes)?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    stdout.write_all(view.until_nul())?;
    stdout.write_all(b"\n")?;

    mmap_view::release(view);
    Ok(())
}
