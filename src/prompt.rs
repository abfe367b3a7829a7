//! Questions asked on the terminal.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use id3_retroencode::{SubstitutionDecision, SubstitutionRequest};
use log::info;

pub fn yes_no(prompt: &str) -> bool {
    loop {
        match read_answer(&format!("{} (y/n)> ", prompt)) {
            None => return false,
            Some(answer) => match answer.to_lowercase().as_str() {
                "y" => return true,
                "n" => return false,
                _ => (),
            },
        }
    }
}

/// Asks what to do with each unmappable character. A replacement given once
/// is reused for the same character in later values and files.
#[derive(Debug, Default)]
pub struct SubstitutionPrompt {
    answers: HashMap<char, String>,
}

impl SubstitutionPrompt {
    pub fn ask(&mut self, request: &SubstitutionRequest<'_>) -> SubstitutionDecision {
        if request.rejected.is_none() {
            if let Some(s) = self.answers.get(&request.character) {
                info!("{}: {:?} -> {:?} as before", request.frame, request.character, s);
                return SubstitutionDecision::Replace(s.clone());
            }
        }

        println!();
        println!(
            "!!! {:?} in <{}> @ POS.{} has no {} encoding !!!",
            request.character, request.frame, request.position, request.target
        );
        if let Some(rejected) = request.rejected {
            println!("    {:?} can't be encoded either", rejected);
        }
        match request.suggested_value() {
            Some(v) => println!("    \"{}\" >>> \"{}\" ?", request.value, v),
            None => println!("    \"{}\" (no suggestion)", request.value),
        }

        loop {
            let answer =
                match read_answer("Enter to accept, type a correction, :s to skip, :q to abort> ") {
                    Some(answer) => answer,
                    None => return SubstitutionDecision::Abort,
                };
            if let Some(decision) = self.decide(request, &answer) {
                return decision;
            }
        }
    }

    /// `None` when the answer needs asking again.
    fn decide(
        &mut self,
        request: &SubstitutionRequest<'_>,
        answer: &str,
    ) -> Option<SubstitutionDecision> {
        let decision = match answer {
            "" => match request.suggestion {
                Some(s) => {
                    self.answers.insert(request.character, s.to_string());
                    SubstitutionDecision::Accept
                }
                None => {
                    println!("    nothing to accept");
                    return None;
                }
            },
            ":s" => SubstitutionDecision::Skip,
            ":q" => SubstitutionDecision::Abort,
            s => {
                if request.target.encode(s).is_some() {
                    self.answers.insert(request.character, s.to_string());
                }
                SubstitutionDecision::Replace(s.to_string())
            }
        };
        Some(decision)
    }
}

// `None` on end of input
fn read_answer(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3_retroencode::LegacyEncoding;
    use pretty_assertions::assert_eq;

    fn request<'a>(suggestion: Option<&'a str>, rejected: Option<&'a str>) -> SubstitutionRequest<'a> {
        SubstitutionRequest {
            frame: "TPE1",
            value: "Sigur Rós",
            value_index: 0,
            position: 7,
            character: 'ó',
            target: LegacyEncoding::ShiftJis,
            suggestion,
            rejected,
        }
    }

    #[test]
    fn decide_test() {
        let mut prompt = SubstitutionPrompt::default();

        assert_eq!(
            prompt.decide(&request(Some("o"), None), ":s"),
            Some(SubstitutionDecision::Skip)
        );
        assert_eq!(
            prompt.decide(&request(Some("o"), None), ":q"),
            Some(SubstitutionDecision::Abort)
        );
        assert_eq!(prompt.decide(&request(None, None), ""), None);
        assert!(prompt.answers.is_empty());

        // unmappable corrections are not remembered
        assert_eq!(
            prompt.decide(&request(Some("o"), None), "ø"),
            Some(SubstitutionDecision::Replace("ø".to_string()))
        );
        assert!(prompt.answers.is_empty());

        assert_eq!(
            prompt.decide(&request(Some("o"), Some("ø")), "oh"),
            Some(SubstitutionDecision::Replace("oh".to_string()))
        );
        assert_eq!(prompt.answers.get(&'ó'), Some(&"oh".to_string()));
    }

    #[test]
    fn remembered_answer_test() {
        let mut prompt = SubstitutionPrompt::default();
        assert_eq!(
            prompt.decide(&request(Some("o"), None), ""),
            Some(SubstitutionDecision::Accept)
        );

        // asked again for the same character: no terminal involved
        assert_eq!(
            prompt.ask(&request(Some("o"), None)),
            SubstitutionDecision::Replace("o".to_string())
        );
    }
}
