use folio::form::{FieldKey, FieldKind, FieldLens, FormModel};

#[derive(Clone, folio::form::FormModel)]
struct DemoForm {
    #[form(kind = "email")]
    email: String,
    #[form(kind = "long-text", label = "Your message")]
    message: String,
    nickname: String,
}

fn main() {
    let fields = DemoForm::fields();
    let lens = fields.email();
    let mut model = DemoForm {
        email: "a@folio.dev".to_string(),
        message: String::new(),
        nickname: "ada".to_string(),
    };
    lens.set(&mut model, "b@folio.dev".to_string());
    assert_eq!(lens.key().as_str(), "email");
    assert_eq!(lens.get(&model), "b@folio.dev");

    let read = model.read_fields();
    assert_eq!(read.len(), 3);
    assert_eq!(read[0].kind, FieldKind::Email);
    assert_eq!(read[1].label, "Your message");
    assert_eq!(read[2].kind, FieldKind::Unclassified);
    assert_eq!(read[2].label, "Nickname");

    assert!(model.set_value(&FieldKey::new("message"), "hello world".to_string()));
    assert!(!model.set_value(&FieldKey::new("unknown"), String::new()));
    model.clear();
    assert!(model.email.is_empty() && model.message.is_empty() && model.nickname.is_empty());
}
