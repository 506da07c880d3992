//! End-to-end tests of the demo apps through the full middleware stack.

use axum::http::{header, Method, StatusCode};

mod common;

use common::{body_string, cookie_pair, get, post_form, send, test_app};

#[tokio::test]
async fn test_widget_route_table() {
    let app = test_app();

    assert_eq!(body_string(get(&app, "/").await).await, "home\n");
    assert_eq!(body_string(get(&app, "/contact").await).await, "contact\n");
    assert_eq!(body_string(get(&app, "/c%6Fntact").await).await, "contact\n");
    assert_eq!(body_string(get(&app, "/gizmo").await).await, "widget gizmo\n");
    assert_eq!(body_string(get(&app, "/gizmo/admin").await).await, "widgetAdmin gizmo\n");

    let res = post_form(&app, "/gizmo/image", "").await;
    assert_eq!(body_string(res).await, "widgetImage gizmo\n");
}

#[tokio::test]
async fn test_widget_api() {
    let app = test_app();

    let res = post_form(&app, "/api/widgets", "slug=gizmo&name=Gizmo").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "apiCreateWidget gizmo 1\n");

    let res = post_form(&app, "/api/widgets", "slug=gizmo&name=Again").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = post_form(&app, "/api/widgets/gizmo", "name=Gizmo%20Pro").await;
    assert_eq!(body_string(res).await, "apiUpdateWidget gizmo\n");

    let list = body_string(get(&app, "/api/widgets").await).await;
    assert!(list.contains("\"slug\":\"gizmo\""));
    assert!(list.contains("Gizmo Pro"));

    let res = post_form(&app, "/api/widgets/gizmo/parts", "name=bolt").await;
    assert_eq!(body_string(res).await, "apiCreateWidgetPart gizmo 1\n");

    let res = post_form(&app, "/api/widgets/gizmo/parts/1/update", "name=screw").await;
    assert_eq!(body_string(res).await, "apiUpdateWidgetPart gizmo 1\n");

    let res = post_form(&app, "/api/widgets/gizmo/parts/1/delete", "").await;
    assert_eq!(body_string(res).await, "apiDeleteWidgetPart gizmo 1\n");

    let res = post_form(&app, "/api/widgets/gizmo/parts/x/update", "name=nut").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = post_form(&app, "/api/widgets/ghost", "name=boo").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_registration() {
    let app = test_app();

    let form = body_string(get(&app, "/user").await).await;
    assert!(form.contains("action=\"/user\""));
    assert!(form.contains("name=\"email\""));

    let res = post_form(
        &app,
        "/user",
        "first=Jane&last=Doe&email=jane%40example.com&password=pw",
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "successfully added user, id=1\n");

    let res = post_form(&app, "/user", "first=Janet&email=jane%40example.com&password=pw").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = post_form(&app, "/user", "first=NoMail&password=pw").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let user = body_string(get(&app, "/user/1").await).await;
    assert!(user.contains("\"email_address\":\"jane@example.com\""));
    assert!(!user.contains("password"));

    let all = body_string(get(&app, "/user/all").await).await;
    assert!(all.starts_with('['));
    assert!(all.contains("Jane"));

    let res = post_form(&app, "/user/1", "last=Smith").await;
    assert_eq!(body_string(res).await, "successfully updated user, id=1\n");
    assert!(body_string(get(&app, "/user/1").await).await.contains("Smith"));

    assert_eq!(get(&app, "/user/99").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/user/abc").await.status(), StatusCode::BAD_REQUEST);

    let res = post_form(&app, "/user/1/delete", "").await;
    assert_eq!(body_string(res).await, "successfully deleted user, id=1\n");
    assert_eq!(get(&app, "/user/1").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_flow() {
    let app = test_app();

    assert!(body_string(get(&app, "/login").await).await.contains("type=\"password\""));
    assert_eq!(get(&app, "/secure/home").await.status(), StatusCode::UNAUTHORIZED);

    let res = post_form(&app, "/login", "username=admin&password=wrong").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = post_form(&app, "/login", "username=admin&password=admin").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/secure/home");
    let cookie = cookie_pair(&res).unwrap();
    assert!(cookie.starts_with("go_sess_id="));

    let res = send(&app, Method::GET, "/secure/home", Some(&cookie), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_string(res).await;
    assert!(body.contains("this is my secure home"));
    assert!(body.contains("user=admin role=admin"));

    let res = send(&app, Method::GET, "/logout", Some(&cookie), None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");
    let cleared = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let res = send(&app, Method::GET, "/secure/home", Some(&cookie), None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_not_found_and_method_not_allowed() {
    let app = test_app();

    let res = get(&app, "/no/such/deep/path").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body_string(res).await.contains("404"));

    let res = send(&app, Method::PUT, "/contact", None, None).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = res.headers().get(header::ALLOW).unwrap().to_str().unwrap();
    assert!(allow.contains("GET"));
}

#[tokio::test]
async fn test_muxer_features() {
    let app = test_app();

    let res = get(&app, "/register").await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/user");

    let res = get(&app, "/contact/../user/all").await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/user/all");

    assert_eq!(get(&app, "/error/500").await.status(), StatusCode::OK);
    assert_eq!(get(&app, "/error/abc").await.status(), StatusCode::EXPECTATION_FAILED);

    let index = body_string(get(&app, "/routes").await).await;
    assert!(index.contains("[POST] /user<br>"));
    assert!(index.contains("<a href=\"/contact\">/contact</a>"));

    let res = get(&app, "/").await;
    assert!(res.headers().contains_key("x-request-id"));

    let templates = body_string(get(&app, "/templates").await).await;
    assert_eq!(templates, "[]");
}
