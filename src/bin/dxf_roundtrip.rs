/// Read a DXF file, print what was decoded and the reader diagnostics, and
/// optionally write it back.
///
/// Usage: dxf_roundtrip <input.dxf> [output.dxf] [--version AC1015] [--parallel] [--failsafe]

use anyhow::{bail, Context};
use dxf_entity_codec::io::dxf::{DxfReaderConfiguration, DxfWriterConfiguration};
use dxf_entity_codec::{DxfReader, DxfVersion, DxfWriter, NotificationType};
use std::time::Instant;

struct Options {
    input: String,
    output: Option<String>,
    version: Option<DxfVersion>,
    reader: DxfReaderConfiguration,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut args = std::env::args().skip(1);
    let mut input = None;
    let mut output = None;
    let mut version = None;
    let mut reader = DxfReaderConfiguration::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--parallel" => reader.parallel = true,
            "--failsafe" => reader.failsafe = true,
            "--version" => {
                let name = args.next().context("--version needs a value such as AC1015")?;
                let parsed = DxfVersion::from_version_string(&name);
                if !parsed.is_known() {
                    bail!("unknown DXF version {}", name);
                }
                version = Some(parsed);
            }
            _ if input.is_none() => input = Some(arg),
            _ if output.is_none() => output = Some(arg),
            _ => bail!("unexpected argument {}", arg),
        }
    }

    let Some(input) = input else {
        bail!("usage: dxf_roundtrip <input.dxf> [output.dxf] [--version AC1015] [--parallel] [--failsafe]");
    };
    Ok(Options {
        input,
        output,
        version,
        reader,
    })
}

fn main() -> anyhow::Result<()> {
    let options = parse_args()?;

    let start = Instant::now();
    let doc = DxfReader::from_file(&options.input)
        .with_context(|| format!("cannot open {}", options.input))?
        .with_configuration(options.reader.clone())
        .read()
        .with_context(|| format!("cannot read {}", options.input))?;
    println!(
        "{}: {} ({}) read in {:.2?}",
        options.input,
        doc.version,
        doc.code_page.as_deref().unwrap_or("no code page"),
        start.elapsed()
    );

    for (table, entries) in doc.tables() {
        println!("  TABLE {:<20} {:>6}", table, entries.len());
    }
    for (name, list) in doc.entities() {
        println!("  ENTITY {:<19} {:>6}", name, list.len());
    }
    for (name, list) in doc.objects() {
        println!("  OBJECT {:<19} {:>6}", name, list.len());
    }

    let kinds = [
        NotificationType::UnknownTag,
        NotificationType::MalformedValue,
        NotificationType::VersionMismatch,
        NotificationType::SubclassMismatch,
        NotificationType::OutOfRange,
        NotificationType::NotImplemented,
        NotificationType::Warning,
        NotificationType::Error,
    ];
    if !doc.notifications.is_empty() {
        println!("{} notification(s):", doc.notifications.len());
        for kind in kinds {
            let count = doc.notifications.of_type(kind).len();
            if count > 0 {
                println!("  {:<16} {:>6}", kind.to_string(), count);
            }
        }
        for notification in &doc.notifications {
            println!("    {}", notification);
        }
    }

    if let Some(output) = &options.output {
        let config = DxfWriterConfiguration {
            version: options.version,
            ..Default::default()
        };
        let writer = DxfWriter::new(&doc).with_configuration(config);
        writer
            .write_to_file(output)
            .with_context(|| format!("cannot write {}", output))?;
        println!("{} written as {}", output, writer.version());
    }

    doc.free_all()?;
    Ok(())
}
