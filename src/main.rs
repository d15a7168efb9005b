use log::{debug, info};
use srecimage::{SrecConfig, SrecError, SrecFile, WriteBounds};
use std::env;
use std::fs;
use std::path::Path;

fn print_usage(program: &str) {
    println!("srecimage - decode Motorola S-record files into a flat memory image");
    println!();
    println!(
        "Usage: {} <file.srec> [--config cfg.toml] [--verify] [--strict] [--patch ADDR:HEX]... [--output image.bin] [--dump]",
        program
    );
    println!("Examples:");
    println!("  {} firmware.s19", program);
    println!("  {} firmware.s19 --patch 0x0100:DEADBEEF --output firmware.bin", program);
    println!();
    println!("--patch overwrites bytes at ADDR (hex, with or without 0x prefix)");
    println!("before the image is written or dumped. It may be given more than once.");
}

struct Options {
    input: String,
    config: Option<String>,
    verify: bool,
    strict: bool,
    patches: Vec<(u32, Vec<u8>)>,
    output: Option<String>,
    dump: bool,
}

fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, String> {
    if text.is_empty() || text.len() % 2 != 0 {
        return Err(format!("Invalid patch data: {}", text));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("Invalid patch data: {}", text))
        })
        .collect()
}

fn parse_patch(spec: &str) -> Result<(u32, Vec<u8>), String> {
    let (addr, data) = spec
        .split_once(':')
        .ok_or_else(|| format!("Invalid patch (expected ADDR:HEX): {}", spec))?;
    let addr = u32::from_str_radix(addr.trim_start_matches("0x"), 16)
        .map_err(|_| format!("Invalid patch address: {}", addr))?;
    Ok((addr, parse_hex_bytes(data)?))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        input: args[1].clone(),
        config: None,
        verify: false,
        strict: false,
        patches: Vec::new(),
        output: None,
        dump: false,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "--patch" | "--output" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("Missing value for {}", args[i]))?;
                match args[i].as_str() {
                    "--config" => options.config = Some(value.clone()),
                    "--output" => options.output = Some(value.clone()),
                    _ => options.patches.push(parse_patch(value)?),
                }
                i += 2;
            }
            "--verify" => {
                options.verify = true;
                i += 1;
            }
            "--strict" => {
                options.strict = true;
                i += 1;
            }
            "--dump" => {
                options.dump = true;
                i += 1;
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
    }
    Ok(options)
}

fn dump(start: u32, bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|b| {
                if b.is_ascii_graphic() || *b == b' ' {
                    *b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!(
            "{:08X}  {:<47}  {}",
            start.wrapping_add((row * 16) as u32),
            hex.join(" "),
            ascii
        );
    }
}

fn run(options: &Options) -> Result<(), SrecError> {
    let mut config = match &options.config {
        Some(path) => SrecConfig::load(Path::new(path))?,
        None => SrecConfig::default(),
    };
    if options.verify {
        config.verify_checksums = true;
    }
    if options.strict {
        config.write_bounds = WriteBounds::Strict;
    }
    debug!("Using config: {:?}", config);

    let mut srec = SrecFile::open(Path::new(&options.input), &config)?;
    print!("{}", srec);

    for (addr, data) in &options.patches {
        srec.set_bytes(*addr, data)?;
        info!("Patched {} bytes at 0x{:08X}", data.len(), addr);
    }

    if options.dump {
        dump(srec.start_address(), srec.bytes());
    }

    if let Some(output) = &options.output {
        fs::write(output, srec.bytes())?;
        println!("Wrote {} bytes to {}", srec.bytes().len(), output);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // No input file: show help and exit successfully
    if args.len() < 2 {
        print_usage(&args[0]);
        return Ok(());
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!();
            print_usage(&args[0]);
            std::process::exit(2);
        }
    };

    if !Path::new(&options.input).exists() {
        eprintln!("Error: S-record file not found: {}", options.input);
        eprintln!();
        eprintln!("Please check:");
        eprintln!("• File path is correct");
        eprintln!("• You're running from the right directory");
        std::process::exit(1);
    }

    if let Err(e) = run(&options) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
