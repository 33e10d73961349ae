use axum::response::Html;

/// The two sign-in surfaces of the platform. Each portal gets its own
/// branding metadata and posts to its own login endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Portal {
    Customer,
    StoreManager,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMeta {
    pub title: &'static str,
    pub description: &'static str,
}

impl Portal {
    pub fn meta(self) -> PageMeta {
        match self {
            Portal::StoreManager => PageMeta {
                title: "QB House Store Manager - Sign In",
                description: "Sign in to the QB House store manager dashboard.",
            },
            Portal::Customer => PageMeta {
                title: "Hair Salon Customer",
                description: "Sign in to book appointments at your favorite salon.",
            },
        }
    }

    pub fn login_action(self) -> &'static str {
        match self {
            Portal::StoreManager => "/api/manage/auth/login",
            Portal::Customer => "/api/auth/login",
        }
    }

    fn heading(self) -> &'static str {
        match self {
            Portal::StoreManager => "Store Manager Sign In",
            Portal::Customer => "Welcome Back",
        }
    }
}

fn sign_in_form(portal: Portal) -> String {
    format!(
        r#"<form method="post" action="{action}" class="sign-in-form">
  <label for="email">Email</label>
  <input type="email" id="email" name="email" autocomplete="email" required>
  <label for="password">Password</label>
  <input type="password" id="password" name="password" autocomplete="current-password" required>
  <button type="submit">Sign In</button>
</form>"#,
        action = portal.login_action()
    )
}

/// Wraps page content in the shared document shell: head metadata plus a
/// single layout element around the body.
fn layout(meta: PageMeta, heading: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <meta name="description" content="{description}">
  <link rel="stylesheet" href="/styles.css">
</head>
<body>
  <main class="auth-layout">
    <h1>{heading}</h1>
{content}
  </main>
</body>
</html>"#,
        title = meta.title,
        description = meta.description,
        heading = heading,
        content = content,
    )
}

pub fn render_sign_in(portal: Portal) -> String {
    layout(portal.meta(), portal.heading(), &sign_in_form(portal))
}

// --- Page handlers ---

pub async fn customer_sign_in() -> Html<String> {
    Html(render_sign_in(Portal::Customer))
}

pub async fn manager_sign_in() -> Html<String> {
    Html(render_sign_in(Portal::StoreManager))
}
