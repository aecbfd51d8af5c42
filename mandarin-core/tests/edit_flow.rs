mod common;

use std::io::Write;

use chrono::NaiveDate;
use mandarin_core::edit::{EditForm, ImageSource, submit};
use mandarin_core::model::profile::ProfileEnvelope;
use mandarin_core::profile::assemble;
use mandarin_core::{Credential, IntroFields, ProfileError};

use common::{Call, FakeApi, UPLOAD_BASE, raw_profile};

const ENCODED: &str = "#intro:hi #pet:dog #gender:남아 #birthdate:2024-01-01 #location:Seoul";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
}

fn credential() -> Credential {
    Credential::new("token")
}

fn own_form() -> EditForm {
    let view = assemble(ProfileEnvelope::own(raw_profile("kong", ENCODED)), today()).unwrap();
    EditForm::from_view(&view)
}

#[test]
fn prefilled_form_reencodes_to_the_stored_intro() {
    let form = own_form();
    assert_eq!(form.username, "kong 보호자");
    assert_eq!(
        form.image,
        ImageSource::Remote(format!("{UPLOAD_BASE}/kong.png"))
    );
    assert_eq!(form.to_request(None).user.intro, ENCODED);
}

#[tokio::test]
async fn unchanged_image_is_not_uploaded() {
    let api = FakeApi::new();
    let form = own_form();

    let view = submit(&api, &credential(), &form, today()).await.unwrap();

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Update(req) => {
            assert_eq!(req.user.intro, ENCODED);
            assert_eq!(req.user.image.as_deref(), Some("https://files.test/kong.png"));
        }
        other => panic!("unexpected call {other:?}"),
    }
    assert_eq!(view.pet.as_deref(), Some("dog"));
    assert_eq!(view.age_label.as_deref(), Some("3개월"));
}

#[tokio::test]
async fn new_local_image_is_uploaded_first() {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

    let api = FakeApi::new();
    let mut form = own_form();
    form.image = ImageSource::Local(file.path().to_path_buf());
    form.fields.location = Some("Busan".into());

    let view = submit(&api, &credential(), &form, today()).await.unwrap();

    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    let uploaded_name = match &calls[0] {
        Call::Upload { file_name, len } => {
            assert!(file_name.ends_with(".png"));
            assert_eq!(*len, 4);
            file_name.clone()
        }
        other => panic!("expected upload first, got {other:?}"),
    };
    match &calls[1] {
        Call::Update(req) => {
            let expected = format!("{UPLOAD_BASE}/{uploaded_name}");
            assert_eq!(req.user.image.as_deref(), Some(expected.as_str()));
            assert!(req.user.intro.ends_with("#location:Busan"));
        }
        other => panic!("expected update, got {other:?}"),
    }
    assert_eq!(view.location.as_deref(), Some("Busan"));
}

#[tokio::test]
async fn failed_upload_aborts_submission() {
    let file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();

    let api = FakeApi::new().failing_uploads();
    let mut form = own_form();
    form.image = ImageSource::Local(file.path().to_path_buf());

    let err = submit(&api, &credential(), &form, today()).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProfileError>(),
        Some(ProfileError::Upload(_))
    ));
    assert!(api.calls().iter().all(|c| !matches!(c, Call::Update(_))));
}

#[tokio::test]
async fn unreadable_image_aborts_before_any_call() {
    let api = FakeApi::new();
    let mut form = own_form();
    form.image = ImageSource::Local("/definitely/not/here.png".into());

    assert!(submit(&api, &credential(), &form, today()).await.is_err());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn required_fields_are_checked_before_network() {
    let api = FakeApi::new();
    let mut form = own_form();
    form.accountname = "   ".into();

    let err = submit(&api, &credential(), &form, today()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProfileError>(),
        Some(ProfileError::MissingField("accountname"))
    ));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn empty_form_writes_empty_segments_and_no_image() {
    let api = FakeApi::new();
    let form = EditForm {
        username: "콩이".into(),
        accountname: "kong".into(),
        fields: IntroFields::default(),
        image: ImageSource::None,
    };

    submit(&api, &credential(), &form, today()).await.unwrap();

    match api.calls().as_slice() {
        [Call::Update(req)] => {
            assert_eq!(req.user.intro, "#intro: #pet: #gender: #birthdate: #location:");
            assert_eq!(req.user.image, None);
        }
        other => panic!("unexpected calls {other:?}"),
    }
}
