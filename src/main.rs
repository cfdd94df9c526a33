use mixin_merge::jvm::class_graph::ClassGraph;
use mixin_merge::jvm::verifier::{VerificationType, Verifier};
use mixin_merge::jvm::{BinaryName, FieldType, Name, ParseDescriptor};
use mixin_merge::*;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::fs;

fn main() -> Result<(), transform::Error> {
    env_logger::init();

    let source_id = Arg::new("source-id")
        .long("source-id")
        .value_name("ID")
        .help("Source id of the mixin config (cleaned and truncated like a real one)");
    let session = Arg::new("session")
        .long("session")
        .value_name("SESSION_ID")
        .help("Fix the session id instead of generating a random one");
    let count = Arg::new("count")
        .long("count")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .default_value("1")
        .help("Allocate this many names in a row");
    let target = Arg::new("target")
        .long("target")
        .value_name("CLASS_NAME")
        .default_value("mixin/Target")
        .help("Target class the names are allocated in (eg. `foo/bar/Baz`)");
    let name = Arg::new("NAME")
        .help("Original member name")
        .required(true)
        .index(1);

    let matches = Command::new("Mixin merge tool")
        .version(clap::crate_version!())
        .about("Allocate merged member names and query the offline verifier")
        .subcommand_required(true)
        .subcommand(
            Command::new("handler-name")
                .about("Allocate injector handler names")
                .arg(source_id.clone())
                .arg(count.clone())
                .arg(target.clone())
                .arg(
                    Arg::new("prefix")
                        .long("prefix")
                        .default_value("handler")
                        .help("Handler prefix of the injector (eg. `redirect`)"),
                )
                .arg(
                    Arg::new("descriptor")
                        .long("descriptor")
                        .value_name("DESCRIPTOR")
                        .default_value("()V")
                        .help("Method descriptor of the handler"),
                )
                .arg(
                    Arg::new("surrogate")
                        .long("surrogate")
                        .action(ArgAction::SetTrue)
                        .help("Allocate as a surrogate handler"),
                )
                .arg(name.clone()),
        )
        .subcommand(
            Command::new("unique-method")
                .about("Allocate names for clashing unique methods")
                .arg(source_id.clone())
                .arg(session.clone())
                .arg(count.clone())
                .arg(target.clone())
                .arg(
                    Arg::new("preserve-prefix")
                        .long("preserve-prefix")
                        .action(ArgAction::SetTrue)
                        .help("Keep the original name in front"),
                )
                .arg(name.clone()),
        )
        .subcommand(
            Command::new("unique-field")
                .about("Allocate names for clashing unique fields")
                .arg(source_id)
                .arg(session)
                .arg(count)
                .arg(target)
                .arg(name),
        )
        .subcommand(
            Command::new("supertype")
                .about("Compute the common supertype of two types in a class hierarchy listing")
                .arg(
                    Arg::new("LISTING")
                        .help("Hierarchy listing file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("TYPE1")
                        .help("Field descriptor (or `null`)")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("TYPE2")
                        .help("Field descriptor (or `null`)")
                        .required(true)
                        .index(3),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("handler-name", matches)) => handler_names(matches),
        Some(("unique-method", matches)) => unique_names(matches, false),
        Some(("unique-field", matches)) => unique_names(matches, true),
        Some(("supertype", matches)) => supertype(matches),
        _ => Ok(()),
    }
}

/// Value of an argument that is required or has a default
fn string_arg<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}

fn source_id(matches: &ArgMatches) -> Option<String> {
    let config = transform::MixinConfig::new("cli");
    match matches.get_one::<String>("source-id") {
        Some(source_id) => config.with_source_id(source_id).clean_source_id(),
        None => None,
    }
}

fn allocator(matches: &ArgMatches) -> Result<transform::SymbolAllocator, transform::Error> {
    let target = BinaryName::from_string(string_arg(matches, "target").to_owned())
        .map_err(jvm::Error::MalformedName)?;
    Ok(transform::SymbolAllocator::new(
        transform::SymbolRegistry::new(),
        target,
    ))
}

fn handler_names(matches: &ArgMatches) -> Result<(), transform::Error> {
    let allocator = allocator(matches)?;
    let source_id = source_id(matches);
    let count = matches.get_one::<usize>("count").copied().unwrap_or(1);
    for _ in 0..count {
        let name = allocator.handler_name(
            source_id.as_deref(),
            string_arg(matches, "prefix"),
            string_arg(matches, "NAME"),
            string_arg(matches, "descriptor"),
            matches.get_flag("surrogate"),
        );
        println!("{}", name);
    }
    Ok(())
}

fn unique_names(matches: &ArgMatches, fields: bool) -> Result<(), transform::Error> {
    let settings = match matches.get_one::<String>("session") {
        Some(session) => transform::Settings::with_session_id(session.as_str())?,
        None => transform::Settings::new(),
    };
    log::info!("Allocating in session {}", settings.session_id);

    let mut allocator = allocator(matches)?;
    let source_id = source_id(matches);
    let original = string_arg(matches, "NAME");
    let count = matches.get_one::<usize>("count").copied().unwrap_or(1);
    for _ in 0..count {
        let name = if fields {
            allocator.unique_field_name(source_id.as_deref(), &settings.session_id, original)
        } else {
            allocator.unique_method_name(
                source_id.as_deref(),
                &settings.session_id,
                original,
                matches.get_flag("preserve-prefix"),
            )
        };
        println!("{}", name);
    }
    Ok(())
}

fn verification_type(descriptor: &str) -> Result<VerificationType, transform::Error> {
    if descriptor == "null" {
        return Ok(VerificationType::Null);
    }
    let field_type = FieldType::<BinaryName>::parse(descriptor)?;
    Ok(VerificationType::from(field_type))
}

fn supertype(matches: &ArgMatches) -> Result<(), transform::Error> {
    let listing_file = string_arg(matches, "LISTING");
    log::info!("Reading hierarchy listing '{}'", listing_file);
    let listing = fs::read_to_string(listing_file)?;
    let graph = ClassGraph::parse_listing(&listing)?;

    let type1 = verification_type(string_arg(matches, "TYPE1"))?;
    let type2 = verification_type(string_arg(matches, "TYPE2"))?;
    let supertype = Verifier::new(&graph).common_supertype(&type1, &type2)?;
    println!("{}", supertype);
    Ok(())
}
