#[cfg(test)]
mod common;

#[cfg(test)]
mod user_tests;

#[cfg(test)]
mod catalog_tests;

#[cfg(test)]
mod case_create_tests;

#[cfg(test)]
mod case_status_tests;




#[cfg(test)]
mod admin_moderation_tests;

#[cfg(test)]
mod invoice_tests;

#[cfg(test)]
mod notification_tests;

#[cfg(test)]
mod chat_tests;
