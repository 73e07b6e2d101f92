use std::sync::Arc;

use clap::Args;
use scholar_registry::error::AppError;
use scholar_registry::registry::{digits_of, RegistrationForm, StudentService};

use crate::infra::InMemoryStudentRepository;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Contact number used for the registration and lookup legs of the demo
    #[arg(long, default_value = "0331-582-1144")]
    pub(crate) contact: String,
}

/// Walk the full registration round trip against an in-memory store:
/// register, fetch the admit card, record a result, look the student up by
/// phone with the formatting stripped.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let contact = args.contact;

    println!("Scholarship registration demo (in-memory store)");

    let repository = Arc::new(InMemoryStudentRepository::default());
    let service = Arc::new(StudentService::new(repository));

    let form = RegistrationForm {
        name: "Ali Khan".to_string(),
        father: "Imran Khan".to_string(),
        grade: "8".to_string(),
        contact: contact.clone(),
        school: "ABC School".to_string(),
        photo_url: None,
        center: "Center A".to_string(),
    };

    let record = match service.register(form).await {
        Ok(record) => record,
        Err(err) => {
            println!("  Registration rejected: {err}");
            return Ok(());
        }
    };
    println!("- Registered {} -> admit id {}", record.name, record.admit_id);

    let card = match service.admit_card(&record.admit_id).await {
        Ok(card) => card,
        Err(err) => {
            println!("  Admit card lookup failed: {err}");
            return Ok(());
        }
    };
    match serde_json::to_string_pretty(&card.view()) {
        Ok(json) => println!("  Admit card payload:\n{json}"),
        Err(err) => println!("  Admit card payload unavailable: {err}"),
    }

    let updated = match service.update_result(&record.admit_id, "Passed", "88%").await {
        Ok(updated) => updated,
        Err(err) => {
            println!("  Result update failed: {err}");
            return Ok(());
        }
    };
    println!(
        "- Result recorded: {} ({})",
        updated.result, updated.score
    );

    // Look the student up with every bit of punctuation stripped, the way a
    // guardian would type it.
    let digits = digits_of(&contact);
    match service.find_by_phone(&digits).await {
        Ok(found) => println!(
            "- Phone lookup for {digits} -> {} (admit id {})",
            found.name, found.admit_id
        ),
        Err(err) => println!("  Phone lookup failed: {err}"),
    }

    Ok(())
}
