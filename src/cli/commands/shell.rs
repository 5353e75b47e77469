//! Interactive shell command handler
//!
//! Signs the user in, then reads commands in a loop until `quit`. Every store
//! operation is reachable from here; errors print and return to the prompt.

use crate::cli::commands::prompt;
use crate::config::Config;
use crate::db::{Activity, ArchivedActivity, Store, User};
use crate::services::{
    ActivityService, ArchiveService, AuthService, LoginData, SeaOrmActivityService,
    SeaOrmArchiveService, SeaOrmAuthService, Session, UpdateUserData, stats,
};

pub async fn cmd_shell(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let session = Session::new();
    session.finish_loading();

    let auth = SeaOrmAuthService::new(store.clone(), session.clone(), config.security.clone());
    let activities = SeaOrmActivityService::new(store.clone(), session.clone());
    let archive = SeaOrmArchiveService::new(store, session.clone());

    let username_or_email = prompt("Username or email")?;
    let password = prompt("Password")?;

    let user = match auth
        .login(LoginData {
            username_or_email,
            password,
        })
        .await
    {
        Ok(user) => user,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    println!();
    println!("Welcome back, {}!", user.first_name);
    println!("Type 'help' to see available commands.");

    loop {
        println!();
        let line = prompt("atlas")?;
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match command {
            "help" => print_shell_help(session.is_admin()),

            "quit" | "exit" => {
                auth.logout();
                println!("Signed out.");
                break;
            }

            "list" | "ls" => match activities.list_activities().await {
                Ok(rows) => print_activities(&rows),
                Err(e) => println!("{e}"),
            },

            "add" => {
                let Some(steps) = args.first().and_then(|s| s.parse::<i64>().ok()) else {
                    println!("Usage: add <steps> [unix-seconds]");
                    continue;
                };
                let date = args.get(1).and_then(|s| s.parse::<i64>().ok());
                match activities.add_activity(steps, date).await {
                    Ok(row) => println!("✓ Recorded {} steps (entry #{})", row.steps, row.id),
                    Err(e) => println!("{e}"),
                }
            }

            "edit" => {
                let (Some(id), Some(steps)) = (
                    args.first().and_then(|s| s.parse::<i32>().ok()),
                    args.get(1).and_then(|s| s.parse::<i64>().ok()),
                ) else {
                    println!("Usage: edit <id> <steps>");
                    continue;
                };
                match activities.update_activity(id, steps).await {
                    Ok(()) => println!("✓ Entry #{id} now has {steps} steps"),
                    Err(e) => println!("{e}"),
                }
            }

            "del" | "rm" => {
                let Some(id) = args.first().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: del <id>");
                    continue;
                };
                match activities.delete_activity(id).await {
                    Ok(()) => println!("✓ Deleted entry #{id}"),
                    Err(e) => println!("{e}"),
                }
            }

            "protect" | "unprotect" => {
                let Some(id) = args.first().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: {command} <id>");
                    continue;
                };
                let result = if command == "protect" {
                    activities.protect_activity(id).await
                } else {
                    activities.unprotect_activity(id).await
                };
                match result {
                    Ok(()) => println!("✓ Entry #{id} is now {command}ed"),
                    Err(e) => println!("{e}"),
                }
            }

            "clear" => {
                if confirm("Delete ALL of your activities?")? {
                    match activities.delete_all_activities().await {
                        Ok(removed) => println!("✓ Deleted {removed} entries"),
                        Err(e) => println!("{e}"),
                    }
                } else {
                    println!("Cancelled.");
                }
            }

            "clear-unprotected" => {
                match activities.delete_all_unprotected().await {
                    Ok(removed) => println!("✓ Deleted {removed} unprotected entries"),
                    Err(e) => println!("{e}"),
                }
            }

            "archive" => {
                let Some(id) = args.first().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: archive <id>");
                    continue;
                };
                archive_entry(&activities, &archive, id).await;
            }

            "archived" => match archive.list_archived().await {
                Ok(rows) => print_archived(&rows),
                Err(e) => println!("{e}"),
            },

            "unarchive" => {
                let Some(id) = args.first().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: unarchive <id>");
                    continue;
                };
                restore_entry(&activities, &archive, id).await;
            }

            "discard" => {
                let Some(id) = args.first().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: discard <id>");
                    continue;
                };
                match archive.delete_archived_activity(id).await {
                    Ok(()) => println!("✓ Discarded archived entry #{id}"),
                    Err(e) => println!("{e}"),
                }
            }

            "clear-archive" => {
                if confirm("Delete ALL of your archived entries?")? {
                    match archive.delete_all_archived().await {
                        Ok(removed) => println!("✓ Deleted {removed} archived entries"),
                        Err(e) => println!("{e}"),
                    }
                } else {
                    println!("Cancelled.");
                }
            }

            "stats" => match activities.list_activities().await {
                Ok(rows) => print_stats(&rows),
                Err(e) => println!("{e}"),
            },

            "profile" => {
                if let Some(user) = session.user() {
                    println!("{} {} <{}>", user.first_name, user.last_name, user.email);
                    println!(
                        "Username: {} | Phone: {} | Admin: {}",
                        user.username,
                        user.phone,
                        if user.is_admin { "yes" } else { "no" }
                    );
                }
            }

            "passwd" => {
                let Some(user) = session.user() else {
                    continue;
                };
                let new_password = prompt("New password")?;
                match auth
                    .update_user(
                        user.id,
                        UpdateUserData {
                            password: Some(new_password),
                            ..Default::default()
                        },
                    )
                    .await
                {
                    Ok(()) => println!("✓ Password updated"),
                    Err(e) => println!("{e}"),
                }
            }

            "delete-account" => {
                let Some(user) = session.user() else {
                    continue;
                };
                if confirm("Delete your account and sign out?")? {
                    match auth.delete_user(user.id).await {
                        Ok(()) => {
                            println!("✓ Account deleted");
                            break;
                        }
                        Err(e) => println!("{e}"),
                    }
                } else {
                    println!("Cancelled.");
                }
            }

            "users" => match auth.get_all_users().await {
                Ok(users) => print_users(&users),
                Err(e) => println!("{e}"),
            },

            "user-stats" => {
                let Some(id) = args.first().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: user-stats <user-id>");
                    continue;
                };
                match activities.get_activities_by_user_id(id).await {
                    Ok(rows) => {
                        print_activities(&rows);
                        print_stats(&rows);
                    }
                    Err(e) => println!("{e}"),
                }
            }

            "reset-user" => {
                let Some(id) = args.first().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: reset-user <user-id>");
                    continue;
                };
                let new_password = prompt("New password for the user")?;
                match auth.reset_user_password(id, &new_password).await {
                    Ok(()) => println!("✓ Password reset for user #{id}"),
                    Err(e) => println!("{e}"),
                }
            }

            "resets" => match auth.get_pending_reset_requests().await {
                Ok(requests) => {
                    if requests.is_empty() {
                        println!("No pending reset requests.");
                    }
                    for request in requests {
                        println!(
                            "#{} {} <{}> requested {}",
                            request.id,
                            request.username,
                            request.email,
                            format_millis(request.requested_at)
                        );
                    }
                }
                Err(e) => println!("{e}"),
            },

            "approve" => {
                let Some(id) = args.first().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: approve <request-id>");
                    continue;
                };
                match auth.approve_password_reset(id).await {
                    Ok(()) => println!("✓ Request #{id} approved"),
                    Err(e) => println!("{e}"),
                }
            }

            other => println!("Unknown command: {other}. Type 'help'."),
        }
    }

    Ok(())
}

/// Copy to the archive first, then delete the original; a crash in between
/// leaves the entry in both places rather than in neither.
async fn archive_entry(
    activities: &SeaOrmActivityService,
    archive: &SeaOrmArchiveService,
    id: i32,
) {
    let rows = match activities.list_activities().await {
        Ok(rows) => rows,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    let Some(entry) = rows.iter().find(|a| a.id == id).copied() else {
        println!("Entry #{id} is not in your activity list.");
        return;
    };

    if let Err(e) = archive.archive_activity(entry.steps, entry.date).await {
        println!("{e}");
        return;
    }
    match activities.delete_activity(id).await {
        Ok(()) => println!("✓ Archived entry #{id}"),
        Err(e) => println!("{e}"),
    }
}

/// Restore is the mirror image: re-insert into the log first, then remove the
/// archived row.
async fn restore_entry(
    activities: &SeaOrmActivityService,
    archive: &SeaOrmArchiveService,
    id: i32,
) {
    let archived = match archive.list_archived().await {
        Ok(rows) => rows,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    let Some(entry) = archived.iter().find(|a| a.id == id).copied() else {
        println!("Entry #{id} is not in your archive (run 'archived' first).");
        return;
    };

    if let Err(e) = activities
        .add_activity(entry.steps, Some(entry.date))
        .await
    {
        println!("{e}");
        return;
    }
    match archive.unarchive_activity(id).await {
        Ok(()) => println!("✓ Restored entry #{id} to your activity list"),
        Err(e) => println!("{e}"),
    }
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{question} (y/N)"))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

fn print_shell_help(is_admin: bool) {
    println!("Activities:");
    println!("  list                 Show your activities");
    println!("  add <steps> [secs]   Record a step count (date defaults to now)");
    println!("  edit <id> <steps>    Change an entry's step count");
    println!("  del <id>             Delete one entry");
    println!("  protect <id>         Exempt an entry from clear-unprotected");
    println!("  unprotect <id>       Remove the exemption");
    println!("  clear                Delete all of your entries");
    println!("  clear-unprotected    Delete your unprotected entries only");
    println!("  stats                Totals, average, and distribution");
    println!();
    println!("Archive:");
    println!("  archive <id>         Move an entry into the archive");
    println!("  archived             Show your archived entries");
    println!("  unarchive <id>       Restore an archived entry");
    println!("  discard <id>         Delete an archived entry permanently");
    println!("  clear-archive        Delete all of your archived entries");
    println!();
    println!("Account:");
    println!("  profile              Show your account details");
    println!("  passwd               Change your password");
    println!("  delete-account       Delete your account");
    if is_admin {
        println!();
        println!("Admin:");
        println!("  users                List all accounts");
        println!("  user-stats <id>      Another user's activities and stats");
        println!("  reset-user <id>      Set a new password for a user");
        println!("  resets               Pending password-reset requests");
        println!("  approve <id>         Approve a reset request");
    }
    println!();
    println!("  help | quit");
}

fn print_activities(rows: &[Activity]) {
    if rows.is_empty() {
        println!("No activities recorded.");
        return;
    }

    println!("Activities ({} total)", rows.len());
    println!("{:-<50}", "");
    for row in rows {
        let marker = if row.is_protected { " 🔒" } else { "" };
        println!(
            "#{:<5} {:>8} steps  {}{marker}",
            row.id,
            row.steps,
            format_seconds(row.date)
        );
    }
}

fn print_archived(rows: &[ArchivedActivity]) {
    if rows.is_empty() {
        println!("Your archive is empty.");
        return;
    }

    println!("Archived ({} total)", rows.len());
    println!("{:-<50}", "");
    for row in rows {
        println!(
            "#{:<5} {:>8} steps  {}  (archived {})",
            row.id,
            row.steps,
            format_seconds(row.date),
            format_seconds(row.archived_at)
        );
    }
}

fn print_users(users: &[User]) {
    println!("Accounts ({} total)", users.len());
    println!("{:-<60}", "");
    for user in users {
        let role = if user.is_admin { "admin" } else { "user" };
        println!(
            "#{:<5} {} {} <{}> [{role}] joined {}",
            user.id,
            user.first_name,
            user.last_name,
            user.email,
            format_millis(user.created_at)
        );
    }
}

fn print_stats(rows: &[Activity]) {
    let summary = stats::summarize(rows);
    if summary.count == 0 {
        println!("No activity data yet.");
        return;
    }

    println!(
        "Total: {} | Average: {} | Max: {} | Min: {} ({} entries)",
        summary.total, summary.average, summary.max, summary.min, summary.count
    );
    for bucket in stats::distribution(rows) {
        println!(
            "  {:<7} {:>3} entries ({:.0}%)",
            bucket.label, bucket.count, bucket.percent
        );
    }
}

fn format_seconds(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map_or_else(|| secs.to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |d| d.format("%Y-%m-%d").to_string())
}
