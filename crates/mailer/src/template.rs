//! Confirmation email content.

/// Subject line for the confirmation email.
pub const CONFIRMATION_SUBJECT: &str = "🎉 Your Spot is Secured - Hyperkit Waitlist Confirmation";

const TRACKING_PARAMS: &str = "utm_source=email&utm_medium=confirmation&utm_campaign=waitlist";

/// Everything needed to render the confirmation email for one entry.
#[derive(Debug, Clone)]
pub struct ConfirmationEmail<'a> {
    pub email: &'a str,
    pub wallet_address: &'a str,
    pub entry_id: &'a str,
    pub base_url: &'a str,
    pub confirmation_url: &'a str,
}

impl ConfirmationEmail<'_> {
    pub fn subject(&self) -> &'static str {
        CONFIRMATION_SUBJECT
    }

    /// Confirmation link with campaign tracking, used in the HTML body.
    pub fn tracked_confirmation_url(&self) -> String {
        let sep = if self.confirmation_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{sep}{TRACKING_PARAMS}&entry_id={}",
            self.confirmation_url, self.entry_id
        )
    }

    pub fn html(&self) -> String {
        let confirm = escape_html(&self.tracked_confirmation_url());
        let website = escape_html(&format!("{}?{TRACKING_PARAMS}", self.base_url));
        let logo = escape_html(&format!(
            "{}/logo/brand/hyperkit/Hyperkit-logo.png",
            self.base_url
        ));
        let email = escape_html(self.email);
        let wallet = escape_html(&short_wallet(self.wallet_address));

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Waitlist Confirmation</title>
</head>
<body style="margin:0;padding:0;background-color:#0f172a;font-family:Arial,Helvetica,sans-serif;color:#e2e8f0;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="background-color:#0f172a;">
<tr><td align="center" style="padding:40px 16px;">
<table role="presentation" width="560" cellpadding="0" cellspacing="0" style="max-width:560px;background-color:#111827;border-radius:16px;">
<tr><td align="center" style="padding:32px 32px 0 32px;">
<a href="{website}"><img src="{logo}" alt="Hyperkit" width="140" style="display:block;border:0;"></a>
</td></tr>
<tr><td align="center" style="padding:24px 32px 8px 32px;">
<h1 style="font-size:30px;font-weight:600;color:#ffffff;margin:0 0 16px 0;">Spot Secured!</h1>
<p style="font-size:16px;color:#94a3b8;line-height:1.6;margin:0;">Thank you for joining the Hyperkit waitlist. This email is proof that you registered for early access to Hyperkit Studio.</p>
</td></tr>
<tr><td style="padding:24px 32px;">
<p style="font-size:10px;text-transform:uppercase;letter-spacing:0.1em;color:#64748b;font-weight:600;margin:0 0 8px 0;">Registration Details</p>
<p style="font-size:14px;margin:0 0 4px 0;">Email: <strong>{email}</strong></p>
<p style="font-size:14px;margin:0;">Wallet: <strong>{wallet}</strong></p>
</td></tr>
<tr><td align="center" style="padding:8px 32px 32px 32px;">
<a href="{confirm}" style="display:inline-block;padding:14px 28px;border-radius:10px;background-color:#6366f1;color:#ffffff;text-decoration:none;font-weight:600;">Confirm Your Email</a>
<p style="font-size:14px;color:#94a3b8;margin:24px 0 0 0;">We'll notify you when Beta Wave 1 launches.</p>
</td></tr>
<tr><td style="padding:16px 32px 32px 32px;">
<p style="margin:0;font-size:12px;color:#475569;text-align:center;line-height:1.5;">If you didn't request this, please ignore this email. This is an automated message from Hyperkit.</p>
</td></tr>
</table>
</td></tr>
</table>
</body>
</html>"#
        )
    }

    pub fn text(&self) -> String {
        format!(
            "🎉 Spot Secured!\n\
             \n\
             Your Hyperkit Waitlist Confirmation\n\
             \n\
             Thank you for joining the Hyperkit waitlist! Your spot has been secured.\n\
             \n\
             This email serves as proof that you've successfully registered for early access to Hyperkit Studio.\n\
             \n\
             Registration Details:\n\
             Email: {}\n\
             Wallet: {}\n\
             \n\
             What's Next?\n\
             We'll notify you when Beta Wave 1 launches. Stay tuned for updates!\n\
             \n\
             Confirm Your Email:\n\
             {}\n\
             \n\
             If you didn't request this, please ignore this email.\n\
             This is an automated message from Hyperkit.",
            self.email,
            short_wallet(self.wallet_address),
            self.confirmation_url
        )
    }
}

/// `0x1234...abcd` form of a wallet address.
pub fn short_wallet(wallet: &str) -> String {
    if wallet.len() <= 10 || !wallet.is_ascii() {
        return wallet.to_string();
    }
    format!("{}...{}", &wallet[..6], &wallet[wallet.len() - 4..])
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>() -> ConfirmationEmail<'a> {
        ConfirmationEmail {
            email: "a@x.com",
            wallet_address: "0xabcd000000000000000000000000000000001234",
            entry_id: "e1",
            base_url: "https://w.example",
            confirmation_url: "https://w.example/api/confirm?token=t0k&id=e1",
        }
    }

    #[test]
    fn shortens_wallet() {
        assert_eq!(
            short_wallet("0xabcd000000000000000000000000000000001234"),
            "0xabcd...1234"
        );
        assert_eq!(short_wallet("0xab"), "0xab");
    }

    #[test]
    fn html_uses_tracked_link() {
        let email = sample();
        let html = email.html();
        assert!(html.contains(
            "https://w.example/api/confirm?token=t0k&amp;id=e1&amp;utm_source=email&amp;utm_medium=confirmation&amp;utm_campaign=waitlist&amp;entry_id=e1"
        ));
        assert!(html.contains("0xabcd...1234"));
    }

    #[test]
    fn text_uses_plain_link() {
        let text = sample().text();
        assert!(text.contains("\nhttps://w.example/api/confirm?token=t0k&id=e1\n"));
        assert!(!text.contains("utm_source"));
        assert!(text.starts_with("🎉 Spot Secured!"));
    }

    #[test]
    fn escapes_user_input() {
        let email = ConfirmationEmail {
            email: "<script>@x.com",
            ..sample()
        };
        assert!(email.html().contains("&lt;script&gt;@x.com"));
    }
}
