use valset_core::{
    binding::IMAGE_INPUT_SHAPE,
    prelude::*,
    tract_core::prelude::Tensor,
};

#[path = "./helpers.rs"]
mod helpers;

#[test]
fn test_image_record_to_binding() {
    let source = StaticSource::new(vec![helpers::jpeg_sample("ILSVRC2012_val_00000001")]);
    let dataset = ImageNet2012Val::new();

    let mut stream = dataset.open(&source).unwrap();
    let record = stream.next_record().unwrap();

    let binding = dataset
        .transform(
            &["input0".to_owned()],
            record,
            Preprocessor::Image(&helpers::zeros_image),
        )
        .unwrap();

    assert_eq!(binding.len(), 1);
    assert_eq!(
        binding["input0"],
        Tensor::zero::<f32>(&IMAGE_INPUT_SHAPE).unwrap()
    );
}

#[test]
fn test_squad_one_paragraph_two_questions() {
    let document = helpers::squad_document(&[(
        "Beyonce was born in Houston.",
        vec!["Where was Beyonce born?", "Who was born in Houston?"],
    )]);

    // The JSON loader hands out the elements of the `data` field.
    let articles = document["data"].as_array().unwrap().clone();
    let source = StaticSource::new(articles.into_iter().map(SourceItem::Row).collect());

    let records: Vec<_> = SquadV1_1::new()
        .open(&source)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        records,
        vec![
            RawRecord::Question(QuestionRecord::new(
                "Beyonce was born in Houston.",
                "Where was Beyonce born?"
            )),
            RawRecord::Question(QuestionRecord::new(
                "Beyonce was born in Houston.",
                "Who was born in Houston?"
            )),
        ]
    );
}

#[test]
fn test_squad_transform_every_record() {
    let document = helpers::squad_document(&[
        ("first context", vec!["q one", "q two"]),
        ("second context", vec!["q three"]),
    ]);
    let articles = document["data"].as_array().unwrap().clone();
    let source = StaticSource::new(articles.into_iter().map(SourceItem::Row).collect());

    let dataset = ValidationSet::Squad(SquadV1_1::new());
    let inputs = vec![
        "segment_ids".to_owned(),
        "input_ids".to_owned(),
        "input_mask".to_owned(),
    ];

    let mut count = 0;
    for record in dataset.open(&source).unwrap() {
        let binding = dataset
            .transform(
                &inputs,
                record.unwrap(),
                Preprocessor::Text(&helpers::fake_tokenizer),
            )
            .unwrap();
        assert_eq!(binding.len(), 3);
        count += 1;
    }

    assert_eq!(count, 3);
}

#[test]
fn test_reopen_restarts() {
    let source = StaticSource::new(vec![
        helpers::jpeg_sample("first"),
        helpers::jpeg_sample("second"),
    ]);
    let dataset = ImageNet2012Val::new();

    let mut stream = dataset.open(&source).unwrap();
    stream.next_record().unwrap();
    stream.next_record().unwrap();
    assert!(stream.next_record().unwrap_err().is_exhausted());

    let mut stream = dataset.open(&source).unwrap();
    match stream.next_record().unwrap() {
        RawRecord::Image(image) => assert_eq!(image.key, "first"),
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn test_cursor_over_validation_set() {
    let source = StaticSource::new(vec![helpers::jpeg_sample("only")]);
    let mut cursor = Cursor::new(
        ValidationSet::from_name("imagenet-2012-val").unwrap(),
        &source,
    );

    assert_eq!(cursor.state(), CursorState::Uninitialized);
    assert!(cursor.next_record().is_ok());
    assert!(matches!(
        cursor.next_record(),
        Err(DatasetError::Exhausted)
    ));
    assert_eq!(cursor.state(), CursorState::Exhausted);
    assert_eq!(cursor.dataset().name(), "imagenet-2012-val");
}
