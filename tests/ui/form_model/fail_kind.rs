use folio::form::FormModel;

#[derive(Clone, FormModel)]
struct CallbackForm {
    #[form(kind = "phone")]
    phone: String,
}

fn main() {
    let form = CallbackForm {
        phone: String::new(),
    };
    let _ = form.phone;
}
