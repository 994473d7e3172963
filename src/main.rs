//! loan-engine CLI
//!
//! Simulate consumer loans from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Simulate a vehicle loan and print the amortization table
//! loan-engine simulate --price 62000000 --down-payment 12000000 --rate 1.8 --term 72
//!
//! # Amortization table for saved terms
//! loan-engine schedule --input terms.json
//!
//! # Reconcile a live balance from a payment history
//! loan-engine balance --input credit.json
//!
//! # Generate a random payment history for testing
//! loan-engine generate --principal 50000000 --rate 0.018 --term 72 --payments 12
//! ```

use loan_engine::core::payment::{ActualPayment, PaymentHistory};
use loan_engine::core::terms::LoanTerms;
use loan_engine::portfolio::simulation::{Simulation, SimulationRequest};
use loan_engine::scenario::generator::{generate_random_history, HistoryConfig};
use loan_engine::schedule::{amortization, annuity};
use loan_engine::tracking::reconciler::BalanceReport;
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"loan-engine — consumer loan simulation and balance tracking

USAGE:
    loan-engine <COMMAND> [OPTIONS]

COMMANDS:
    simulate    Compute the payment and amortization table for a loan
    schedule    Print the amortization table for saved terms
    balance     Reconcile the live balance from a payment history
    generate    Generate a random payment history (for testing)
    help        Show this message

OPTIONS (simulate):
    --name <NAME>           Simulation name (default: "simulation")
    --price <AMOUNT>        Vehicle price
    --down-payment <AMOUNT> Down payment (default: 0)
    --rate <PERCENT>        Monthly rate in percent, e.g. 1.8
    --term <MONTHS>         Term in months
    --format <FORMAT>       Output format: text (default) or json

OPTIONS (schedule, balance):
    --input <FILE>          Path to JSON terms file
    --format <FORMAT>       Output format: text (default) or json

OPTIONS (generate):
    --principal <AMOUNT>    Financed amount
    --rate <DECIMAL>        Monthly rate as a decimal, e.g. 0.018
    --term <MONTHS>         Term in months
    --payments <N>          Number of payments to generate (default: 12)
    --output <FILE>         Write to file instead of stdout

EXAMPLES:
    loan-engine simulate --price 62000000 --down-payment 12000000 --rate 1.8 --term 72
    loan-engine schedule --input terms.json --format json
    loan-engine balance --input credit.json
    loan-engine generate --principal 50000000 --rate 0.018 --term 72 --payments 12"#
    );
}

/// JSON schema for input terms. `monthly_payment` may be omitted, in
/// which case it is computed from the annuity formula.
#[derive(serde::Deserialize)]
struct TermsInput {
    principal: String,
    monthly_rate: String,
    term_months: u32,
    monthly_payment: Option<String>,
}

#[derive(serde::Deserialize)]
struct PaymentInput {
    date: chrono::DateTime<chrono::Utc>,
    amount_paid: String,
    #[serde(default)]
    extra_to_capital: Option<String>,
    #[serde(default)]
    insurance_and_others: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(serde::Deserialize)]
struct CreditFile {
    #[serde(flatten)]
    terms: TermsInput,
    #[serde(default)]
    payments: Vec<PaymentInput>,
}

#[derive(serde::Serialize)]
struct RowOutput {
    period: u32,
    payment: String,
    principal: String,
    interest: String,
    balance: String,
}

#[derive(serde::Serialize)]
struct SimulateOutput {
    name: String,
    amount_to_finance: String,
    monthly_payment: String,
    total_interest_paid: String,
    total_loan_cost: String,
    schedule: Vec<RowOutput>,
}

#[derive(serde::Serialize)]
struct BalanceOutput {
    original_principal: String,
    current_balance: String,
    payments_applied: usize,
    total_paid: String,
    total_extra_to_capital: String,
    progress_percent: f64,
    paid_off: bool,
}

#[derive(serde::Serialize)]
struct PaymentOutput {
    date: chrono::DateTime<chrono::Utc>,
    amount_paid: String,
    extra_to_capital: String,
    insurance_and_others: String,
}

#[derive(serde::Serialize)]
struct HistoryOutput {
    principal: String,
    monthly_rate: String,
    term_months: u32,
    monthly_payment: String,
    payments: Vec<PaymentOutput>,
}

fn parse_decimal(what: &str, value: &str) -> Decimal {
    value.parse().unwrap_or_else(|e| {
        eprintln!("Invalid {} '{}': {}", what, value, e);
        process::exit(1);
    })
}

fn terms_from_input(input: &TermsInput) -> LoanTerms {
    let principal = parse_decimal("principal", &input.principal);
    let rate = parse_decimal("monthly rate", &input.monthly_rate);
    let payment = match &input.monthly_payment {
        Some(p) => parse_decimal("monthly payment", p),
        None => annuity::periodic_payment(principal, rate, input.term_months).unwrap_or_else(|e| {
            eprintln!("Error computing payment: {}", e);
            process::exit(1);
        }),
    };
    LoanTerms::new(principal, rate, input.term_months, payment).unwrap_or_else(|e| {
        eprintln!("Invalid terms: {}", e);
        process::exit(1);
    })
}

fn schedule_rows(schedule: &amortization::AmortizationSchedule) -> Vec<RowOutput> {
    schedule
        .rows()
        .iter()
        .map(|row| RowOutput {
            period: row.period_number,
            payment: row.payment_amount.round_dp(2).to_string(),
            principal: row.principal_component.round_dp(2).to_string(),
            interest: row.interest_component.round_dp(2).to_string(),
            balance: row.remaining_balance.round_dp(2).to_string(),
        })
        .collect()
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    })
}

fn cmd_simulate(args: &[String]) {
    let mut name = "simulation".to_string();
    let mut price = None;
    let mut down_payment = Decimal::ZERO;
    let mut rate = None;
    let mut term = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--name" => {
                i += 1;
                name = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--name requires a value");
                    process::exit(1);
                });
            }
            "--price" => {
                i += 1;
                price = args.get(i).map(|v| parse_decimal("price", v));
            }
            "--down-payment" => {
                i += 1;
                down_payment = args
                    .get(i)
                    .map(|v| parse_decimal("down payment", v))
                    .unwrap_or(Decimal::ZERO);
            }
            "--rate" => {
                i += 1;
                rate = args.get(i).map(|v| parse_decimal("rate", v));
            }
            "--term" => {
                i += 1;
                term = args.get(i).and_then(|s| s.parse().ok());
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let price = price.unwrap_or_else(|| {
        eprintln!("Error: --price <AMOUNT> is required");
        process::exit(1);
    });
    let rate = rate.unwrap_or_else(|| {
        eprintln!("Error: --rate <PERCENT> is required");
        process::exit(1);
    });
    let term = term.unwrap_or_else(|| {
        eprintln!("Error: --term <MONTHS> is required");
        process::exit(1);
    });

    let simulation = Simulation::from_request(SimulationRequest {
        name,
        vehicle_price: price,
        down_payment,
        monthly_rate_percent: rate,
        term_months: term,
    })
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let schedule = simulation.schedule();

    if format == "json" {
        let output = SimulateOutput {
            name: simulation.name().to_string(),
            amount_to_finance: simulation.terms().principal().to_string(),
            monthly_payment: simulation.terms().periodic_payment().round_dp(2).to_string(),
            total_interest_paid: simulation.total_interest_paid().round_dp(2).to_string(),
            total_loan_cost: simulation.total_loan_cost().round_dp(2).to_string(),
            schedule: schedule_rows(&schedule),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("=== {} ===", simulation.name());
        println!("Amount to finance: {}", simulation.terms().principal());
        println!(
            "Monthly payment:   {}",
            simulation.terms().periodic_payment().round_dp(2)
        );
        println!(
            "Total interest:    {}",
            simulation.total_interest_paid().round_dp(2)
        );
        println!(
            "Total loan cost:   {}",
            simulation.total_loan_cost().round_dp(2)
        );
        println!();
        println!("{}", schedule);
    }
}

fn cmd_schedule(args: &[String]) {
    let (input_path, format) = parse_input_format(args);
    let content = read_file(&input_path);
    let input: TermsInput = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{ "principal": "50000000", "monthly_rate": "0.018", "term_months": 72 }}"#
        );
        process::exit(1);
    });

    let terms = terms_from_input(&input);
    let schedule = amortization::generate(&terms);

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&schedule_rows(&schedule)).unwrap()
        );
    } else {
        println!("{}", schedule);
    }
}

fn cmd_balance(args: &[String]) {
    let (input_path, format) = parse_input_format(args);
    let content = read_file(&input_path);
    let file: CreditFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "principal": "50000000", "monthly_rate": "0.018", "term_months": 72,
  "payments": [
    {{ "date": "2024-01-15T12:00:00Z", "amount_paid": "2100000", "extra_to_capital": "500000" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let terms = terms_from_input(&file.terms);

    let mut history = PaymentHistory::new();
    for p in &file.payments {
        let mut payment = ActualPayment::new(p.date, parse_decimal("amount_paid", &p.amount_paid));
        if let Some(extra) = &p.extra_to_capital {
            payment = payment.with_extra_to_capital(parse_decimal("extra_to_capital", extra));
        }
        if let Some(insurance) = &p.insurance_and_others {
            payment =
                payment.with_insurance_and_others(parse_decimal("insurance_and_others", insurance));
        }
        if let Some(note) = &p.note {
            payment = payment.with_note(note.clone());
        }
        history.add(payment);
    }

    // The report sorts by date before replaying.
    let report = BalanceReport::from_history(&terms, &history);

    if format == "json" {
        let output = BalanceOutput {
            original_principal: report.original_principal.to_string(),
            current_balance: report.current_balance.round_dp(2).to_string(),
            payments_applied: report.payments_applied,
            total_paid: report.total_paid.round_dp(2).to_string(),
            total_extra_to_capital: report.total_extra_to_capital.round_dp(2).to_string(),
            progress_percent: report.progress_percent(),
            paid_off: report.paid_off(),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("{}", report);
    }
}

fn cmd_generate(args: &[String]) {
    let mut principal = None;
    let mut rate = None;
    let mut term = None;
    let mut payment_count = 12usize;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--principal" => {
                i += 1;
                principal = args.get(i).map(|v| parse_decimal("principal", v));
            }
            "--rate" => {
                i += 1;
                rate = args.get(i).map(|v| parse_decimal("rate", v));
            }
            "--term" => {
                i += 1;
                term = args.get(i).and_then(|s| s.parse().ok());
            }
            "--payments" => {
                i += 1;
                payment_count = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--payments requires a number");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let principal = principal.unwrap_or_else(|| {
        eprintln!("Error: --principal <AMOUNT> is required");
        process::exit(1);
    });
    let rate = rate.unwrap_or_else(|| {
        eprintln!("Error: --rate <DECIMAL> is required");
        process::exit(1);
    });
    let term = term.unwrap_or_else(|| {
        eprintln!("Error: --term <MONTHS> is required");
        process::exit(1);
    });

    let payment = annuity::periodic_payment(principal, rate, term).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let terms = LoanTerms::new(principal, rate, term, payment).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let config = HistoryConfig {
        payment_count,
        ..Default::default()
    };
    let history = generate_random_history(&terms, &config);

    let output = HistoryOutput {
        principal: principal.to_string(),
        monthly_rate: rate.to_string(),
        term_months: term,
        monthly_payment: payment.to_string(),
        payments: history
            .payments()
            .iter()
            .map(|p| PaymentOutput {
                date: p.payment_date(),
                amount_paid: p.total_amount_paid().to_string(),
                extra_to_capital: p.extra_to_capital().to_string(),
                insurance_and_others: p.insurance_and_others().to_string(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} payments against {} over {} months → {}",
            history.len(),
            principal,
            term,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn parse_input_format(args: &[String]) -> (String, String) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    (path, format)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "simulate" => cmd_simulate(rest),
        "schedule" => cmd_schedule(rest),
        "balance" => cmd_balance(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
