use prefix_writer::PrefixWriter;
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() -> std::io::Result<()> {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let stdout = std::io::stdout();
    let mut handler = stdout.lock();

    let mut build = PrefixWriter::new(&mut handler, "build: ");
    writeln!(&mut build, "I am prefixed")?;
    write!(&mut build, "so am I,\n\nand the empty line above")?;
    writeln!(&mut build, " too")?;
    drop(build);

    let mut test = PrefixWriter::new(&mut handler, "test:  ");
    writeln!(&mut test, "another stream")?;
    eprintln!("{} bytes written with prefix {:?}", test.written(), "test:  ");

    Ok(())
}
