use crate::cli::LanguagesArgs;
use crate::exit_codes;
use crate::output;
use nurga_client::api::{SummaryLength, SUPPORTED_LANGUAGES};
use serde::Serialize;

#[derive(Serialize)]
struct LanguageInfo {
    code: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct SummaryLengthInfo {
    value: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
struct LanguagesOutput {
    languages: Vec<LanguageInfo>,
    summary_lengths: Vec<SummaryLengthInfo>,
}

pub fn execute(args: LanguagesArgs) -> i32 {
    if args.json {
        let listing = LanguagesOutput {
            languages: SUPPORTED_LANGUAGES
                .iter()
                .map(|&(code, name)| LanguageInfo { code, name })
                .collect(),
            summary_lengths: SummaryLength::ALL
                .iter()
                .map(|len| SummaryLengthInfo {
                    value: len.as_str(),
                    description: len.description(),
                })
                .collect(),
        };

        match output::to_json(&listing, false) {
            Ok(json) => {
                if let Err(e) = output::write_output(&json, None) {
                    eprintln!("Error: {}", e);
                    return exit_codes::IO_ERROR;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::IO_ERROR;
            }
        }
    } else {
        println!("{:<8} Language", "Code");
        println!("{}", "-".repeat(30));
        for (code, name) in SUPPORTED_LANGUAGES {
            println!("{:<8} {}", code, name);
        }
        println!();
        println!("{:<10} Summary length", "Value");
        println!("{}", "-".repeat(40));
        for len in SummaryLength::ALL {
            println!("{:<10} {}", len.as_str(), len.description());
        }
    }

    exit_codes::SUCCESS
}
