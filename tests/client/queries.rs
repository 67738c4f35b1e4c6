use httpmock::Method::{GET, POST, PUT};
use icm_extract::core::{Query, SessionToken, SourceProvider};
use serde_json::json;

use crate::common;

#[tokio::test]
async fn data_requests_carry_token_and_language() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/icmnfext/assets/i18n/en.json")
            .header("authorization", "Bearer tok")
            .header("accept-language", "EN");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(common::translations());
    });

    let client = common::client_for(&server);
    let body = client
        .fetch(&SessionToken::new("Bearer tok"), &Query::Translations)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(body, common::translations());
}

#[tokio::test]
async fn list_values_use_the_list_id_parameter() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/icmnfRest/lov/")
            .query_param("listValIds", "UPP_STATUS");
        then.status(200).json_body(common::status_list());
    });

    let client = common::client_for(&server);
    let query = Query::ListValues {
        list_id: "UPP_STATUS".into(),
    };
    client.fetch(&SessionToken::new("t"), &query).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn material_and_part_requests_are_posts() {
    let server = common::setup_server();
    let materials = server.mock(|when, then| {
        when.method(POST)
            .path("/icmnfRest/upp/uppMatDataProvider")
            .json_body(json!([{ "dataProviderName": "DP_UPPVIEWMAT" }]));
        then.status(200).json_body(common::material_data());
    });
    let parts = server.mock(|when, then| {
        when.method(POST)
            .path("/icmnfRest/dataprovider/chgelemPart")
            .json_body(json!([100, -1]));
        then.status(200).json_body(common::parts());
    });

    let client = common::client_for(&server);
    let token = SessionToken::new("t");
    client
        .fetch(
            &token,
            &Query::MaterialData {
                body: json!([{ "dataProviderName": "DP_UPPVIEWMAT" }]),
            },
        )
        .await
        .unwrap();
    client
        .fetch(&token, &Query::ChangeElementParts { seqs: vec![100, -1] })
        .await
        .unwrap();

    materials.assert();
    parts.assert();
}

#[tokio::test]
async fn class_requests_are_puts() {
    let server = common::setup_server();
    let filter = server.mock(|when, then| {
        when.method(PUT)
            .path("/icmnfRest/upp/uppviewMatClassesFilter")
            .json_body(json!({ "prostructSeq": 1 }));
        then.status(200).json_body(common::class_filter());
    });
    let data = server.mock(|when, then| {
        when.method(PUT)
            .path("/icmnfRest/dataprovider/uppviewMatClassParamDataProvider")
            .json_body(json!({
                "calcPermissions": true,
                "calcQuality": false,
                "classParamSeqs": [10, 11],
                "uppviewMatSeqs": [7, 8]
            }));
        then.status(200).json_body(common::class_param_data());
    });

    let client = common::client_for(&server);
    let token = SessionToken::new("t");
    client
        .fetch(&token, &Query::ClassFilter { body: json!({ "prostructSeq": 1 }) })
        .await
        .unwrap();
    client
        .fetch(
            &token,
            &Query::ClassParamData {
                class_param_seqs: vec![10, 11],
                material_seqs: vec![7, 8],
            },
        )
        .await
        .unwrap();

    filter.assert();
    data.assert();
}

#[tokio::test]
async fn base_url_path_is_kept() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/proxy/icmnfext/assets/i18n/en.json");
        then.status(200).json_body(json!({}));
    });

    let client = icm_extract::IcmClient::builder()
        .base_url(url::Url::parse(&server.url("/proxy")).unwrap())
        .build()
        .unwrap();
    client
        .fetch(&SessionToken::new("t"), &Query::Translations)
        .await
        .unwrap();
    mock.assert();
}
