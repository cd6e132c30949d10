use common::{
    context::HandlerContext,
    entities::contact::{CreateContact, NewContact, ServiceType},
    error::FieldViolation,
};
use regex::Regex;

lazy_static::lazy_static! {
    static ref NAME: Regex = Regex::new(r"^[a-zA-Z\s'-]+$").unwrap();
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref PHONE: Regex = Regex::new(r"^[0-9\s\-\(\)\+]+$").unwrap();
}

type Rule<T> = Result<T, &'static str>;

/// Checks every field and collects one violation per failing field, in
/// form order. On success the trimmed, normalized values are returned
/// ready for storage.
pub fn validate(
    input: &CreateContact,
    provenance: &HandlerContext,
) -> Result<NewContact, Vec<FieldViolation>> {
    let name = check_name(trimmed(&input.name));
    let email = check_email(trimmed(&input.email));
    let phone = check_phone(trimmed(&input.phone));
    let service = check_service(trimmed(&input.service));
    let message = check_message(trimmed(&input.message));

    let mut errors = Vec::new();
    collect(&mut errors, "name", &name);
    collect(&mut errors, "email", &email);
    collect(&mut errors, "phone", &phone);
    collect(&mut errors, "service", &service);
    collect(&mut errors, "message", &message);

    match (name, email, phone, service, message) {
        (Ok(name), Ok(email), Ok(phone), Ok(service), Ok(message)) => Ok(NewContact {
            name,
            email,
            phone,
            service,
            message,
            ip_address: provenance.ip_address.clone(),
            user_agent: provenance.user_agent.clone(),
        }),
        _ => Err(errors),
    }
}

fn collect<T>(errors: &mut Vec<FieldViolation>, field: &str, rule: &Rule<T>) {
    if let Err(message) = rule {
        errors.push(FieldViolation::new(field, message));
    }
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

fn length_between(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

fn check_name(name: &str) -> Rule<String> {
    if name.is_empty() {
        return Err("Name is required");
    }
    if !length_between(name, 2, 100) {
        return Err("Name must be between 2 and 100 characters");
    }
    if !NAME.is_match(name) {
        return Err("Name can only contain letters, spaces, hyphens, and apostrophes");
    }
    Ok(name.to_string())
}

fn check_email(email: &str) -> Rule<String> {
    if email.is_empty() {
        return Err("Email is required");
    }
    if !is_email(email) {
        return Err("Please provide a valid email address");
    }
    Ok(normalize_email(email))
}

fn is_email(email: &str) -> bool {
    if email.len() > 254 || !EMAIL.is_match(email) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && domain
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}

/// Lowercases the address and applies the canonical form of the big
/// mailbox providers, so one inbox maps to one stored address.
pub fn normalize_email(email: &str) -> String {
    let email = email.to_lowercase();
    let Some((local, domain)) = email.rsplit_once('@') else {
        return email.clone();
    };

    let strip_tag = |local: &str, separator: char| -> String {
        local
            .split(separator)
            .next()
            .unwrap_or_default()
            .to_string()
    };

    let (local, domain) = match domain {
        "gmail.com" | "googlemail.com" => (strip_tag(local, '+').replace('.', ""), "gmail.com"),
        "outlook.com" | "hotmail.com" | "live.com" | "icloud.com" | "me.com" => {
            (strip_tag(local, '+'), domain)
        }
        "yahoo.com" | "ymail.com" | "rocketmail.com" => (strip_tag(local, '-'), domain),
        _ => (local.to_string(), domain),
    };

    if local.is_empty() {
        return email.clone();
    }
    format!("{}@{}", local, domain)
}

fn check_phone(phone: &str) -> Rule<String> {
    if phone.is_empty() {
        return Err("Phone number is required");
    }
    if !PHONE.is_match(phone) {
        return Err("Please provide a valid phone number");
    }
    if !length_between(phone, 10, 20) {
        return Err("Phone number must be between 10 and 20 characters");
    }
    Ok(phone.to_string())
}

fn check_service(service: &str) -> Rule<Option<String>> {
    if service.is_empty() {
        return Ok(None);
    }
    service
        .parse::<ServiceType>()
        .map(|service| Some(service.as_str().to_string()))
        .map_err(|_| "Invalid service type")
}

fn check_message(message: &str) -> Rule<String> {
    if message.is_empty() {
        return Err("Message is required");
    }
    if !length_between(message, 10, 1000) {
        return Err("Message must be between 10 and 1000 characters");
    }
    Ok(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CreateContact {
        CreateContact {
            name: Some("Jo Lee".to_string()),
            email: Some("jo@example.com".to_string()),
            phone: Some("770-376-7161".to_string()),
            service: Some("maintenance".to_string()),
            message: Some("Need annual furnace tune-up please.".to_string()),
        }
    }

    fn fields(errors: &[FieldViolation]) -> Vec<&str> {
        errors.iter().map(|x| x.field.as_str()).collect()
    }

    #[test]
    fn valid_input_passes() {
        let provenance = HandlerContext {
            ip_address: Some("10.0.0.7".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };
        let contact = validate(&valid_input(), &provenance).unwrap();
        assert_eq!(contact.name, "Jo Lee");
        assert_eq!(contact.service.as_deref(), Some("maintenance"));
        assert_eq!(contact.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(contact.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn values_are_trimmed() {
        let input = CreateContact {
            name: Some("  Mary O'Neil-Smith ".to_string()),
            email: Some(" Jo@Example.com ".to_string()),
            phone: Some(" (770) 376 7161 ".to_string()),
            service: Some(" emergency ".to_string()),
            message: Some("\n  The furnace stopped working.  \n".to_string()),
        };
        let contact = validate(&input, &HandlerContext::default()).unwrap();
        assert_eq!(contact.name, "Mary O'Neil-Smith");
        assert_eq!(contact.email, "jo@example.com");
        assert_eq!(contact.phone, "(770) 376 7161");
        assert_eq!(contact.service.as_deref(), Some("emergency"));
        assert_eq!(contact.message, "The furnace stopped working.");
    }

    #[test]
    fn blank_or_missing_service_is_allowed() {
        let mut input = valid_input();
        input.service = Some("  ".to_string());
        assert_eq!(validate(&input, &HandlerContext::default()).unwrap().service, None);

        input.service = None;
        assert_eq!(validate(&input, &HandlerContext::default()).unwrap().service, None);
    }

    #[test]
    fn short_message_is_the_only_violation() {
        let mut input = valid_input();
        input.message = Some("Hello".to_string());

        let errors = validate(&input, &HandlerContext::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldViolation::new(
                "message",
                "Message must be between 10 and 1000 characters"
            )]
        );
    }

    #[test]
    fn each_single_rule_reports_its_field() {
        let cases: Vec<(&str, Box<dyn Fn(&mut CreateContact)>)> = vec![
            ("name", Box::new(|x: &mut CreateContact| x.name = Some("J".to_string()))),
            ("name", Box::new(|x: &mut CreateContact| x.name = Some("Jo Lee 3rd".to_string()))),
            ("name", Box::new(|x: &mut CreateContact| x.name = Some("a".repeat(101)))),
            ("email", Box::new(|x: &mut CreateContact| x.email = Some("jo@example".to_string()))),
            ("email", Box::new(|x: &mut CreateContact| x.email = None)),
            ("phone", Box::new(|x: &mut CreateContact| x.phone = Some("770-376".to_string()))),
            ("phone", Box::new(|x: &mut CreateContact| x.phone = Some("call me maybe".to_string()))),
            ("phone", Box::new(|x: &mut CreateContact| x.phone = Some("1".repeat(21)))),
            ("phone", Box::new(|x: &mut CreateContact| x.phone = Some("٧٧٠٣٧٦٧١٦١".to_string()))),
            ("service", Box::new(|x: &mut CreateContact| x.service = Some("plumbing".to_string()))),
            ("message", Box::new(|x: &mut CreateContact| x.message = Some("m".repeat(1001)))),
            ("message", Box::new(|x: &mut CreateContact| x.message = Some("   ".to_string()))),
        ];

        for (field, mutate) in cases {
            let mut input = valid_input();
            mutate(&mut input);
            let errors = validate(&input, &HandlerContext::default()).unwrap_err();
            assert_eq!(fields(&errors), vec![field], "input: {:?}", input);
        }
    }

    #[test]
    fn reports_every_failing_field_once() {
        let input = CreateContact {
            name: None,
            email: Some("not-an-email".to_string()),
            phone: Some("12".to_string()),
            service: Some("plumbing".to_string()),
            message: Some("short".to_string()),
        };
        let errors = validate(&input, &HandlerContext::default()).unwrap_err();
        assert_eq!(fields(&errors), vec!["name", "email", "phone", "service", "message"]);
        assert_eq!(errors[0].message, "Name is required");
        assert_eq!(errors[2].message, "Phone number must be between 10 and 20 characters");
    }

    #[test]
    fn length_limits_are_inclusive() {
        let mut input = valid_input();
        input.name = Some("Jo".to_string());
        input.phone = Some("1".repeat(20));
        input.message = Some("m".repeat(1000));
        assert!(validate(&input, &HandlerContext::default()).is_ok());

        input.phone = Some("7703767161".to_string());
        input.message = Some("m".repeat(10));
        assert!(validate(&input, &HandlerContext::default()).is_ok());
    }

    #[test]
    fn normalizes_provider_addresses() {
        assert_eq!(normalize_email("Jo.Lee+hvac@GoogleMail.com"), "jolee@gmail.com");
        assert_eq!(normalize_email("jo+site@outlook.com"), "jo@outlook.com");
        assert_eq!(normalize_email("jo-site@yahoo.com"), "jo@yahoo.com");
        assert_eq!(normalize_email("Jo.Lee+x@Example.COM"), "jo.lee+x@example.com");
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_email("jo@@example.com"));
        assert!(!is_email("jo lee@example.com"));
        assert!(!is_email(".jo@example.com"));
        assert!(!is_email("jo..lee@example.com"));
        assert!(!is_email("jo@-example.com"));
        assert!(is_email("jo.lee@mail.example.co.uk"));
    }
}
